pub(crate) mod crop;
pub(crate) mod surface;
pub(crate) mod watermark;
