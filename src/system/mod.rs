pub(crate) mod logger;
