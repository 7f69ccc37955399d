//! Rewrite the layout of an unpacked wheel so that it can be imported from its own root.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use bzlpip_fs::Simplified;

pub use namespace::{
    add_pkgutil_style_namespace_pkg_init, implicit_namespace_packages,
    setup_namespace_pkg_compatibility,
};
pub use purelib::spread_purelib_into_root;

mod namespace;
mod purelib;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Failed to walk the package directory")]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    Wheel(#[from] bzlpip_wheel::Error),
    #[error("Cannot move purelib contents into the package root; `{}` already exists", _0.simplified_display())]
    Collision(PathBuf),
}
