use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct GetCourseVideoDetails {
    pub video_id: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoDetails {
    pub video_id: u64,
    pub title: String,
    /// Length of the video in seconds
    pub duration: u32,
    pub thumbnail: String,
}

/// Looks up a course video. Details are derived from the id, so the same id
/// always gives the same video.
pub fn get_course_video_details(request: &GetCourseVideoDetails) -> VideoDetails {
    let mut rng = StdRng::seed_from_u64(request.video_id);

    VideoDetails {
        video_id: request.video_id,
        title: format!("Video {}", request.video_id),
        duration: rng.gen_range(10..60 * 60 * 10),
        thumbnail: format!(
            "https://localhost:3000/cdn/video-thumbnails/{}",
            request.video_id
        ),
    }
}
