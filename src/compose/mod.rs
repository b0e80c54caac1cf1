pub(crate) mod compositor;
pub(crate) mod crop_provider;
pub(crate) mod session;
