pub(crate) mod address;
pub(crate) mod name;
pub(crate) mod postal_code;
