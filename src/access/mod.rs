pub mod policy;

pub use policy::AccessPolicy;
