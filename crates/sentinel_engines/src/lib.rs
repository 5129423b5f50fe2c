#![forbid(unsafe_code)]

pub mod audio_sampler;
pub mod explain;
pub mod fuse;
pub mod motion_sampler;
pub mod ring;
pub mod zone_match;
