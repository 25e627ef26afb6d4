pub(crate) mod sao;
