use crate::service::Playlist;

pub fn render_playlists_view(playlists: &[Playlist]) -> Vec<String> {
    if playlists.is_empty() {
        return vec![
            "Playlists".to_string(),
            "  No playlists yet. Create one with `new <title>`".to_string(),
        ];
    }

    let mut lines = vec![format!("Playlists ({})", playlists.len())];
    lines.extend(playlists.iter().enumerate().map(|(i, p)| playlist_line(i, p)));
    lines
}

fn playlist_line(index: usize, playlist: &Playlist) -> String {
    let count = match playlist.videos.len() {
        1 => "1 video".to_string(),
        n => format!("{} videos", n),
    };
    match playlist.recent_video() {
        Some(video) => format!("{:>3}  {}  [{}]  latest: {}", index + 1, playlist.title, count, video.title),
        None => format!("{:>3}  {}  [{}]", index + 1, playlist.title, count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::Video;

    fn playlist(title: &str, videos: &[&str]) -> Playlist {
        Playlist {
            id: format!("pl-{}", title),
            title: title.to_string(),
            order: 0,
            videos: videos
                .iter()
                .map(|t| Video {
                    id: t.to_string(),
                    title: t.to_string(),
                    channel: "Channel".to_string(),
                    duration_seconds: 60,
                    thumbnail_url: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_blank_state() {
        let lines = render_playlists_view(&[]);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("No playlists yet"));
    }

    #[test]
    fn test_rows_show_latest_video() {
        let lines = render_playlists_view(&[
            playlist("Workout", &["first", "second"]),
            playlist("Chill", &[]),
        ]);
        assert_eq!(lines[0], "Playlists (2)");
        assert_eq!(lines[1], "  1  Workout  [2 videos]  latest: second");
        assert_eq!(lines[2], "  2  Chill  [0 videos]");
    }
}
