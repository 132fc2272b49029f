pub mod unsharp;

pub use unsharp::sharpen;
