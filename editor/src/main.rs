use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sliceworks_doc::{Document, ObjectId, Rect, Slice, SliceKey};
use sliceworks_editor::{
    EditContext, EditError, LogStatusSink, Params, RemoveSliceCommand, UndoCommand, command,
    load_or_default, share,
};

/// Sliceworks command line editor.
#[derive(Parser, Debug)]
#[command(
    name = "sliceworks",
    about = "Remove a slice (or its key at a frame) from a demo sprite",
    long_about = "Builds a demo sprite with an 'Icon' and a 'Button' slice, runs the \
        Remove Slice command against it and prints the resulting slices.\n\n\
        EXAMPLES:\n\
          # Clear the key of 'Icon' at frame 1\n\
          sliceworks --name Icon --frame 1\n\
        \n\
          # Remove a single-key slice, then undo\n\
          sliceworks --name Icon --keys 1 --undo",
    version
)]
struct Args {
    /// Editor configuration file.
    #[arg(long, default_value = "sliceworks.toml")]
    config: PathBuf,

    /// Name of the slice to remove. Takes priority over --id.
    #[arg(long)]
    name: Option<String>,

    /// Object id of the slice to remove.
    #[arg(long)]
    id: Option<String>,

    /// Current frame.
    #[arg(long, default_value = "0")]
    frame: u32,

    /// Number of keys of the demo 'Icon' slice (one per frame).
    #[arg(long, default_value = "3", value_parser = clap::value_parser!(u32).range(1..))]
    keys: u32,

    /// Undo the edit afterwards.
    #[arg(long)]
    undo: bool,
}

fn demo_document(keys: u32) -> (Document, ObjectId) {
    let mut document = Document::new("demo", keys.max(4));
    let layer = document.add_layer("Layer 1");

    let mut icon = Slice::new("Icon");
    for frame in 0..keys {
        let offset = frame as i32 * 2;
        icon.set_key(frame, SliceKey::new(Rect::new(offset, offset, 16, 16)));
    }
    let button = Slice::new("Button").with_key(0, SliceKey::new(Rect::new(32, 0, 24, 8)));

    for slice in [icon, button] {
        if let Err(e) = document.push_slice(slice) {
            log::error!("Failed to build demo sprite: {e}");
        }
    }
    (document, layer)
}

fn print_slices(document: &Document) {
    println!("{} slice(s) in '{}':", document.slices().len(), document.name());
    for slice in document.slices().iter() {
        let frames: Vec<String> = slice.keys().frames().map(|f| f.to_string()).collect();
        println!(
            "  {} '{}' keys at [{}]",
            slice.id(),
            slice.name(),
            frames.join(", ")
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_or_default(&args.config);

    let (document, layer) = demo_document(args.keys);
    let shared = share(document, &config);
    let ctx = EditContext::new(config)
        .with_document(shared.clone())
        .with_frame(args.frame)
        .with_active_layer(layer)
        .with_status(Arc::new(LogStatusSink));

    let mut params = Params::new();
    if let Some(name) = &args.name {
        params.set("name", name);
    }
    if let Some(id) = &args.id {
        params.set("id", id);
    }
    if params.is_empty() {
        params.set("name", "Icon");
    }

    let mut outcome = command::run(&mut RemoveSliceCommand::new(), &ctx, &params);
    if outcome.is_ok() && args.undo {
        outcome = command::run(&mut UndoCommand, &ctx, &Params::new());
    }

    match shared.read() {
        Ok(reader) => print_slices(&reader),
        Err(e) => log::error!("Cannot read document: {e}"),
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(EditError::NotFound(_)) => ExitCode::from(2),
        Err(_) => ExitCode::FAILURE,
    }
}
