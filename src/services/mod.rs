pub mod candidates;
pub mod catalog;
pub mod extraction;
pub mod normalize;
pub mod nutrients;
pub mod pipeline;
pub mod resolver;
pub mod similarity;
