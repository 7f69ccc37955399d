pub(crate) use extract::extract;
pub(crate) use requirements::requirements;

mod extract;
mod requirements;
