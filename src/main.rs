use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use board2fen::classifier::{EmptyBoardClassifier, PieceClassifier};
use board2fen::{Orientation, RecognizeOptions, Recognizer, RecognizerConfig, Side, logger};

#[derive(Parser)]
#[command(name = "board2fen")]
#[command(about = "Read a chess position (FEN) from a photo of a board")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognise the board in a single image
    Recognize(RecognizeArgs),

    /// Run the HTTP recognition service
    Serve(ServeArgs),
}

#[derive(Args)]
struct ModelArgs {
    /// Piece classifier weights (.rten)
    #[arg(long, value_name = "FILE", env = "MODEL_WEIGHTS")]
    model: Option<PathBuf>,

    /// JSON file overriding pipeline parameters
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct RecognizeArgs {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Side to move: w or b
    #[arg(long, default_value = "w")]
    turn: Side,

    /// The photo was taken from Black's side of the board
    #[arg(long)]
    black_at_bottom: bool,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Args)]
struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    #[command(flatten)]
    model: ModelArgs,
}

/// Returns the classifier and whether real weights were loaded
fn load_classifier(model: Option<&PathBuf>) -> anyhow::Result<(Arc<dyn PieceClassifier>, bool)> {
    match model {
        #[cfg(feature = "model")]
        Some(path) => {
            info!("Loading model weights from {}", path.display());
            let classifier = board2fen::classifier::model::ModelClassifier::load(path)?;
            Ok((Arc::new(classifier), true))
        }
        #[cfg(not(feature = "model"))]
        Some(path) => anyhow::bail!(
            "Cannot load {}: built without the `model` feature",
            path.display()
        ),
        None => {
            warn!("No model weights given, every square will be reported empty");
            Ok((Arc::new(EmptyBoardClassifier), false))
        }
    }
}

fn build_recognizer(args: &ModelArgs) -> anyhow::Result<(Recognizer, bool)> {
    let config = match &args.config {
        Some(path) => RecognizerConfig::load(path)?,
        None => RecognizerConfig::default(),
    };
    let (classifier, model_loaded) = load_classifier(args.model.as_ref())?;
    Ok((Recognizer::new(classifier).with_config(config), model_loaded))
}

fn run_recognize(args: RecognizeArgs, verbose: bool) -> anyhow::Result<()> {
    let (mut recognizer, _) = build_recognizer(&args.model)?;
    if let Some(debug_dir) = args.debug_out {
        recognizer = recognizer.with_debug(debug_dir)?;
    }

    info!("Loading image: {}", args.image_path.display());
    let bytes = std::fs::read(&args.image_path)?;
    let image = board2fen::decode_image(&bytes)?;
    info!("Image loaded: {}x{}", image.width(), image.height());

    let orientation = if args.black_at_bottom {
        Orientation::BlackAtBottom
    } else {
        Orientation::WhiteAtBottom
    };
    let options = RecognizeOptions::new(args.turn).with_orientation(orientation);
    let (position, result) = recognizer.recognize_position(image, options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        if verbose {
            println!("{}\n", position);
        }
        println!("{}", result.fen);
        println!("confidence: {:.2}", result.confidence);
    }

    Ok(())
}

#[cfg(feature = "server")]
fn run_serve(args: ServeArgs) -> anyhow::Result<()> {
    use board2fen::server::{AppState, serve};

    let (recognizer, model_loaded) = build_recognizer(&args.model)?;
    let state = AppState {
        recognizer: Arc::new(recognizer),
        model_loaded,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(state, args.port))
}

#[cfg(not(feature = "server"))]
fn run_serve(_args: ServeArgs) -> anyhow::Result<()> {
    anyhow::bail!("Built without the `server` feature")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match cli.command {
        Command::Recognize(args) => run_recognize(args, cli.verbose),
        Command::Serve(args) => run_serve(args),
    }
}
