pub mod contact;
pub mod joint;
