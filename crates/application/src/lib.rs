pub mod clock;
pub mod usecases;
