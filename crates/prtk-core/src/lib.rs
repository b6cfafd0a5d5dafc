pub mod common;
pub mod domain;
pub mod modules;
pub mod numerics;
pub mod pipelines;
pub mod tables;
