pub(crate) mod x86;
