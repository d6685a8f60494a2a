//! # Kernel Layout Information
//!
//! Fixed facts about the kernel the monitor is embedded in: the memory
//! layout constants of the [`memory`] module and the link-time
//! [`KernelImage`] symbol record behind the `kerninfo` command.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod image;
pub mod memory;

pub use image::KernelImage;
