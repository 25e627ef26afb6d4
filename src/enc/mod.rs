pub(crate) mod sao;
pub(crate) mod util;
