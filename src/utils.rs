pub mod html;
pub mod markdown;
pub mod net;
