//! Stream-list parsing and quality selection.
//!
//! The metadata names an HLS master playlist; its variants are the candidate
//! stream links. Selection must be deterministic for a fixed candidate set,
//! so ties are always resolved by listing order.

use m3u8_rs::Playlist;
use url::Url;

use crate::error::TipsportError;
use crate::site::QualityPreference;

/// One candidate stream link from the stream list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLink {
    pub url: String,
    /// Quality label as shown to the user, e.g. "1280x720".
    pub quality: String,
    pub bandwidth: u64,
}

pub(crate) fn parse_stream_list(
    playlist_url: &Url,
    body: &[u8],
) -> Result<Vec<StreamLink>, TipsportError> {
    // The m3u8 parser is lenient with non-playlist bodies (error pages,
    // maintenance HTML), so insist on the mandatory header first.
    if !body.trim_ascii_start().starts_with(b"#EXTM3U") {
        return Err(TipsportError::UnableGetStreamList);
    }
    let playlist =
        m3u8_rs::parse_playlist_res(body).map_err(|_| TipsportError::UnableGetStreamList)?;

    let links = match playlist {
        Playlist::MasterPlaylist(master) => {
            let mut links = Vec::with_capacity(master.variants.len());
            for variant in master.variants {
                // Bandwidth is the numeric id the selection is keyed on; a
                // variant without one cannot be ranked.
                if variant.bandwidth == 0 {
                    return Err(TipsportError::UnableGetStreamNumber);
                }
                let url = playlist_url.join(&variant.uri).map_err(|e| {
                    TipsportError::Other(format!("invalid variant uri {}: {e}", variant.uri))
                })?;
                links.push(StreamLink {
                    url: url.to_string(),
                    quality: variant
                        .resolution
                        .map(|r| format!("{}x{}", r.width, r.height))
                        .unwrap_or_default(),
                    bandwidth: variant.bandwidth,
                });
            }
            links
        }
        // A media playlist is already the stream itself, single quality.
        Playlist::MediaPlaylist(_) => vec![StreamLink {
            url: playlist_url.to_string(),
            quality: "source".to_string(),
            bandwidth: 0,
        }],
    };

    if links.is_empty() {
        return Err(TipsportError::UnableGetStreamList);
    }
    Ok(links)
}

/// Deterministic quality selection.
///
/// `Label` picks the first candidate with that exact label and falls back to
/// `Highest` when absent. `Highest`/`Lowest` compare bandwidth with strict
/// ordering, so among equals the earliest listed candidate wins.
pub(crate) fn select_stream<'a>(
    links: &'a [StreamLink],
    preference: &QualityPreference,
) -> Result<&'a StreamLink, TipsportError> {
    let first = links.first().ok_or(TipsportError::UnableGetStreamList)?;

    let selected = match preference {
        QualityPreference::Label(label) => links
            .iter()
            .find(|link| link.quality == *label)
            .unwrap_or_else(|| highest(links, first)),
        QualityPreference::Highest => highest(links, first),
        QualityPreference::Lowest => links.iter().fold(first, |best, link| {
            if link.bandwidth < best.bandwidth {
                link
            } else {
                best
            }
        }),
    };
    Ok(selected)
}

fn highest<'a>(links: &'a [StreamLink], first: &'a StreamLink) -> &'a StreamLink {
    links.iter().fold(first, |best, link| {
        if link.bandwidth > best.bandwidth {
            link
        } else {
            best
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER_PLAYLIST: &str = "#EXTM3U\n\
#EXT-X-STREAM-INF:BANDWIDTH=2962000,RESOLUTION=1280x720,CODECS=\"avc1.4d401f,mp4a.40.2\"\n\
720/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=1427000,RESOLUTION=854x480\n\
480/index.m3u8\n\
#EXT-X-STREAM-INF:BANDWIDTH=688000,RESOLUTION=640x360\n\
360/index.m3u8\n";

    fn base() -> Url {
        Url::parse("https://live.tipsport.cz/hls/4321001/index.m3u8").unwrap()
    }

    fn links() -> Vec<StreamLink> {
        parse_stream_list(&base(), MASTER_PLAYLIST.as_bytes()).unwrap()
    }

    #[test]
    fn parses_master_playlist_variants() {
        let links = links();
        assert_eq!(links.len(), 3);
        assert_eq!(links[0].quality, "1280x720");
        assert_eq!(links[0].bandwidth, 2962000);
        assert_eq!(links[0].url, "https://live.tipsport.cz/hls/4321001/720/index.m3u8");
    }

    #[test]
    fn media_playlist_is_a_single_source_link() {
        let body = "#EXTM3U\n#EXT-X-TARGETDURATION:6\n#EXTINF:6.0,\nseg0.ts\n#EXT-X-ENDLIST\n";
        let links = parse_stream_list(&base(), body.as_bytes()).unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].quality, "source");
        assert_eq!(links[0].url, base().to_string());
    }

    #[test]
    fn empty_candidate_set_is_stream_list_failure() {
        let err = select_stream(&[], &QualityPreference::Highest).unwrap_err();
        assert!(matches!(err, TipsportError::UnableGetStreamList));
    }

    #[test]
    fn garbage_body_is_stream_list_failure() {
        let err = parse_stream_list(&base(), b"<html>oops</html>").unwrap_err();
        assert!(matches!(err, TipsportError::UnableGetStreamList));
    }

    #[test]
    fn selection_is_deterministic() {
        let links = links();
        for _ in 0..3 {
            let highest = select_stream(&links, &QualityPreference::Highest).unwrap();
            assert_eq!(highest.quality, "1280x720");
            let lowest = select_stream(&links, &QualityPreference::Lowest).unwrap();
            assert_eq!(lowest.quality, "640x360");
        }
    }

    #[test]
    fn label_selects_exact_match() {
        let links = links();
        let selected =
            select_stream(&links, &QualityPreference::Label("854x480".to_string())).unwrap();
        assert_eq!(selected.quality, "854x480");
    }

    #[test]
    fn missing_label_falls_back_to_highest() {
        let links = links();
        let selected =
            select_stream(&links, &QualityPreference::Label("1080p".to_string())).unwrap();
        assert_eq!(selected.quality, "1280x720");
    }

    #[test]
    fn bandwidth_ties_keep_listing_order() {
        let tied = vec![
            StreamLink {
                url: "a".into(),
                quality: "a".into(),
                bandwidth: 1000,
            },
            StreamLink {
                url: "b".into(),
                quality: "b".into(),
                bandwidth: 1000,
            },
        ];
        let highest = select_stream(&tied, &QualityPreference::Highest).unwrap();
        assert_eq!(highest.url, "a");
        let lowest = select_stream(&tied, &QualityPreference::Lowest).unwrap();
        assert_eq!(lowest.url, "a");
    }
}
