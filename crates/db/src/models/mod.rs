pub mod common;
pub mod flashcard;
pub mod idea;
pub mod inbox_item;
pub mod life_area;
pub mod note;
pub mod project;
pub mod task;
