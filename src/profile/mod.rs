//! The user's profile: display name and photo.

mod core;
mod page;

pub use core::{
    Profile, ProfileName, create_profile, create_profile_table, get_profile, parse_photo_url,
    update_profile,
};
pub use page::{get_profile_page, update_profile_endpoint};
