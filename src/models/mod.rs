mod article;
mod dimension;

pub use article::*;
pub use dimension::*;
