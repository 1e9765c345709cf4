//! Audio mix graph construction.
//!
//! One gain-controlled path per enabled channel feeds a shared summing
//! destination. Paths are independent: removing or muting a channel
//! cannot affect any other channel's signal. An empty graph is a valid,
//! supported outcome — the recording proceeds with a silent track and a
//! non-fatal warning.

use scenecast_composition_model::AudioChannelSpec;

/// A pull-based source of interleaved f32 samples.
pub trait AudioBlockSource: Send {
    /// Pull up to `max_frames` frames of interleaved samples.
    /// Returns `None` once the stream has ended.
    fn next_block(&mut self, max_frames: usize) -> Option<Vec<f32>>;
}

/// One audio input offered to the mix graph.
pub struct AudioChannel {
    pub spec: AudioChannelSpec,
    pub source: Box<dyn AudioBlockSource>,
}

impl AudioChannel {
    pub fn new(spec: AudioChannelSpec, source: Box<dyn AudioBlockSource>) -> Self {
        Self { spec, source }
    }
}

/// Per-channel gain stage.
#[derive(Debug, Clone, Copy)]
struct GainNode {
    gain: f32,
}

impl GainNode {
    fn new(gain: f32) -> Self {
        Self {
            gain: gain.clamp(0.0, 1.0),
        }
    }

    fn scaled(&self, sample: f32) -> f32 {
        sample * self.gain
    }
}

struct ChannelPath {
    label: String,
    gain: GainNode,
    source: Box<dyn AudioBlockSource>,
    finished: bool,
}

/// The constructed mixing graph: N independent gain paths into one
/// summing destination.
pub struct MixGraph {
    paths: Vec<ChannelPath>,
    sample_rate: u32,
    channel_count: u16,
}

impl MixGraph {
    /// Build the graph from the given channels. Disabled channels are
    /// omitted entirely, so they have no path into the destination.
    pub fn build(channels: Vec<AudioChannel>, sample_rate: u32, channel_count: u16) -> Self {
        let paths: Vec<ChannelPath> = channels
            .into_iter()
            .filter(|c| c.spec.enabled)
            .map(|c| ChannelPath {
                label: c.spec.label.clone(),
                gain: GainNode::new(c.spec.gain()),
                source: c.source,
                finished: false,
            })
            .collect();

        if paths.is_empty() {
            tracing::warn!("Audio mix graph has no enabled channels; output will be silent");
        } else {
            tracing::info!(
                paths = paths.len(),
                sample_rate,
                "Audio mix graph constructed"
            );
        }

        Self {
            paths,
            sample_rate,
            channel_count,
        }
    }

    /// Whether the destination carries zero audio paths.
    pub fn is_silent(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// Pull and sum the next block of up to `max_frames` frames.
    ///
    /// Returns `None` once every path has ended (or the graph is empty).
    /// Sources that deliver short blocks contribute what they have; the
    /// rest of the block stays at the other channels' sum.
    pub fn mix_block(&mut self, max_frames: usize) -> Option<Vec<f32>> {
        if self.paths.is_empty() {
            return None;
        }

        let len = max_frames * self.channel_count as usize;
        let mut out = vec![0.0f32; len];

        for path in &mut self.paths {
            if path.finished {
                continue;
            }
            match path.source.next_block(max_frames) {
                Some(block) => {
                    for (i, sample) in block.iter().enumerate().take(len) {
                        out[i] += path.gain.scaled(*sample);
                    }
                }
                None => {
                    tracing::debug!(channel = %path.label, "Audio channel ended");
                    path.finished = true;
                }
            }
        }

        if self.paths.iter().all(|p| p.finished) {
            return None;
        }

        for sample in &mut out {
            *sample = sample.clamp(-1.0, 1.0);
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstSource {
        value: f32,
        remaining_blocks: usize,
    }

    impl AudioBlockSource for ConstSource {
        fn next_block(&mut self, max_frames: usize) -> Option<Vec<f32>> {
            if self.remaining_blocks == 0 {
                return None;
            }
            self.remaining_blocks -= 1;
            Some(vec![self.value; max_frames * 2])
        }
    }

    fn channel(label: &str, value: f32, gain: f32, enabled: bool) -> AudioChannel {
        AudioChannel::new(
            AudioChannelSpec::new(label, gain, enabled),
            Box::new(ConstSource {
                value,
                remaining_blocks: 4,
            }),
        )
    }

    #[test]
    fn each_enabled_channel_gets_a_path() {
        let graph = MixGraph::build(
            vec![
                channel("content", 0.1, 1.0, true),
                channel("mic", 0.2, 0.8, true),
                channel("disabled", 0.3, 1.0, false),
            ],
            48000,
            2,
        );
        assert_eq!(graph.path_count(), 2);
        assert!(!graph.is_silent());
    }

    #[test]
    fn mixed_block_sums_gain_scaled_sources() {
        let mut graph = MixGraph::build(
            vec![
                channel("a", 0.2, 1.0, true),
                channel("b", 0.4, 0.5, true),
            ],
            48000,
            2,
        );
        let block = graph.mix_block(8).unwrap();
        assert_eq!(block.len(), 16);
        for sample in block {
            assert!((sample - 0.4).abs() < 1e-6); // 0.2*1.0 + 0.4*0.5
        }
    }

    #[test]
    fn muting_one_channel_leaves_others_unchanged() {
        let mut with_mute = MixGraph::build(
            vec![
                channel("a", 0.25, 1.0, true),
                channel("b", 0.5, 0.0, true),
            ],
            48000,
            2,
        );
        let mut solo = MixGraph::build(vec![channel("a", 0.25, 1.0, true)], 48000, 2);

        let muted = with_mute.mix_block(16).unwrap();
        let alone = solo.mix_block(16).unwrap();
        assert_eq!(muted, alone);
    }

    #[test]
    fn empty_graph_is_silent_not_an_error() {
        let mut graph = MixGraph::build(
            vec![channel("off", 0.5, 1.0, false)],
            48000,
            2,
        );
        assert!(graph.is_silent());
        assert_eq!(graph.mix_block(8), None);
    }

    #[test]
    fn block_ends_when_all_sources_end() {
        let mut graph = MixGraph::build(
            vec![AudioChannel::new(
                AudioChannelSpec::new("short", 1.0, true),
                Box::new(ConstSource {
                    value: 0.1,
                    remaining_blocks: 1,
                }),
            )],
            48000,
            2,
        );
        assert!(graph.mix_block(4).is_some());
        assert_eq!(graph.mix_block(4), None);
    }

    #[test]
    fn mixed_output_is_clamped() {
        let mut graph = MixGraph::build(
            vec![
                channel("a", 0.9, 1.0, true),
                channel("b", 0.9, 1.0, true),
            ],
            48000,
            2,
        );
        let block = graph.mix_block(4).unwrap();
        for sample in block {
            assert!(sample <= 1.0);
        }
    }
}
