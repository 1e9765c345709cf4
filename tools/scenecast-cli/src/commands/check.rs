//! Check encoder capabilities.

use scenecast_common::config::AppConfig;
use scenecast_recorder::encoder::element_available;
use scenecast_recorder::CODEC_PREFERENCES;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Scenecast System Check");
    println!("{}", "=".repeat(50));

    let mut selected = None;
    for candidate in CODEC_PREFERENCES {
        let elements = [
            candidate.video_encoder,
            candidate.audio_encoder,
            candidate.muxer,
        ];
        let supported = elements.iter().all(|&e| element_available(e));
        let marker = if supported { "OK" } else { "--" };
        println!(
            "[{marker}] {} ({} + {} -> .{})",
            candidate.name, candidate.video_encoder, candidate.audio_encoder, candidate.file_extension
        );
        for &element in &elements {
            if !element_available(element) {
                println!("     missing element: {element}");
            }
        }
        if supported && selected.is_none() {
            selected = Some(candidate.name);
        }
    }

    println!();
    match selected {
        Some(name) => println!("Recordings will use: {name}"),
        None => println!("No supported encoder found; recording and re-encoding are unavailable."),
    }

    if let Some(codec) = &config.recording.codec {
        println!("Configured codec override: {codec}");
    }

    let font_status = if config.overlay_font.exists() {
        "found"
    } else {
        "missing (watermark and REC label disabled)"
    };
    println!("Overlay font: {} [{font_status}]", config.overlay_font.display());
    println!("Recordings directory: {}", config.recordings_dir.display());

    Ok(())
}
