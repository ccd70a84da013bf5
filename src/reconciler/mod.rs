mod failure;
mod manager;
mod matcher;
mod normalizer;

pub use manager::Reconciler;
