#![no_std]
#![cfg_attr(docs_rs, feature(doc_cfg))]

//! A crate for turning PNG data into Netpbm data.
//!
//! Only the simple end of PNG is supported: 8 bits per channel, no
//! interlacing, and the Greyscale, RGB, and Indexed color types. That's
//! exactly the set of images that a `P5` (PGM) or `P6` (PPM) file can hold
//! without losing anything.
//!
//! * [`png`] parses the chunk stream, decompresses, unfilters, and resolves
//!   the palette.
//! * [`netpbm`] writes the resulting [`Image`] as PGM or PPM bytes.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(target_pointer_width = "16")]
compile_error!("this crate assumes 32-bit or bigger pointers!");

pub mod error;
pub use error::*;

pub mod pixel_formats;
pub use pixel_formats::*;

pub mod options;
pub use options::*;

mod parser_helpers;
pub(crate) use parser_helpers::*;

#[cfg(feature = "alloc")]
pub mod image;
#[cfg(feature = "alloc")]
pub use image::*;

#[cfg(feature = "png")]
pub mod png;

#[cfg(feature = "netpbm")]
pub mod netpbm;
