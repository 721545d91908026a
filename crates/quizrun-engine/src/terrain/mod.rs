pub mod binder;
pub mod decel;
pub mod layouts;
pub mod noise;
pub mod obstacles;
pub mod rng;
pub mod row;
pub mod scroll;
pub mod stream;
