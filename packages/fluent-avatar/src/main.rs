// avatar-chat - talk to the avatar from a terminal

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fluent_avatar::console::{ConsoleRecognizer, ConsoleSynthesizer, NoCamera, NoClassifier};
use fluent_avatar::domain::EmotionLabel;
use fluent_avatar::{
    AvatarApp, AvatarConfig, AvatarEvent, EventType, GeminiGateway, Phase, SceneLayout,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with the avatar by typing")]
struct Args {
    /// Emotion the avatar believes you are showing
    #[arg(long, default_value = "neutral")]
    emotion: EmotionLabel,

    /// Assistant model, overriding AVATAR_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Quiet period before typed lines are sent, in milliseconds
    #[arg(long, default_value_t = 2000)]
    silence_ms: u64,

    /// Print replies without speaking them
    #[arg(long)]
    mute: bool,

    /// Print the scene layout as JSON and exit
    #[arg(long)]
    dump_scene: bool,
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.dump_scene {
        println!("{}", serde_json::to_string_pretty(&SceneLayout::default())?);
        return Ok(());
    }

    init_tracing()?;

    let mut config =
        AvatarConfig::from_env().with_silence_timeout(Duration::from_millis(args.silence_ms));
    if let Some(model) = args.model {
        config.model = model;
    }

    let gateway = GeminiGateway::new(&config)?;
    let recognizer = ConsoleRecognizer::new();
    let app = AvatarApp::new(
        &config,
        NoCamera,
        NoClassifier,
        recognizer.clone(),
        gateway,
        ConsoleSynthesizer::default(),
    )
    .await;

    app.bus()
        .subscribe(EventType::TurnCompleted, |event| {
            Box::pin(async move {
                if let AvatarEvent::TurnCompleted(turn) = event {
                    println!("you ({}): {}", turn.emotion_at_speech, turn.user_speech);
                    println!(
                        "avatar ({}, {}): {}",
                        turn.ai_emotion, turn.animation, turn.ai_response
                    );
                }
                Ok(())
            })
        })
        .await;

    if args.mute {
        app.set_speech_enabled(false).await;
    }
    app.select_emotion(args.emotion).await;

    println!("Type to talk. Commands: /emotion <label>, /track, /quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "/quit" {
            break;
        }
        if line == "/track" {
            match app.toggle_tracking().await {
                Ok(active) => println!("face tracking {}", if active { "on" } else { "off" }),
                Err(e) => println!("face tracking unavailable: {e}"),
            }
            continue;
        }
        if let Some(label) = line.strip_prefix("/emotion") {
            match label.trim().parse::<EmotionLabel>() {
                Ok(emotion) => app.select_emotion(emotion).await,
                Err(e) => println!("{e}"),
            }
            continue;
        }

        if !recognizer.deliver(&app, line).await? {
            println!("(still thinking about the last thing you said, try again in a moment)");
        }
    }

    // Let a pending utterance go out before shutting down
    recognizer.end_session();
    let deadline = tokio::time::Instant::now() + config.silence_timeout + config.request_timeout;
    while app.phase().await != Phase::Idle && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    while app.presenter().is_speaking() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    app.shutdown().await;
    Ok(())
}
