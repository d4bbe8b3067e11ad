pub mod compare;
pub mod cut_points;
pub mod landing;
pub mod reward_factor;
pub mod risk;
pub mod trends;
