//! # chatclone CLI
//!
//! Command-line interface for the chatclone library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatclone::ChatCloneError;
use chatclone::cli::{Cli, Command, ExportArgs, PrepareArgs, SegmentArgs, SubmitArgs};
use chatclone::config::PipelineConfig;
use chatclone::parser::ChatExportParser;
use chatclone::payload::RawTextFormat;
use chatclone::pipeline::{Prepared, prepare, prepare_with_roles};
use chatclone::submit::TrainingClient;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = <Cli as ClapParser>::parse();
    let result = match cli.command {
        Command::Speakers(args) => run_speakers(&args),
        Command::Prepare(args) => run_prepare(&args),
        Command::Submit(args) => run_submit(&args),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run_speakers(args: &ExportArgs) -> Result<(), ChatCloneError> {
    let parser = ChatExportParser::with_config(args.parser_config());
    let export = parser.parse_file(&args.archive)?;

    for warning in &export.warnings {
        println!("⚠️  {}", warning);
    }
    for speaker in &export.speakers {
        let count = export
            .messages
            .iter()
            .filter(|m| &m.speaker == speaker)
            .count();
        println!("{}\t{} messages", speaker, count);
    }
    Ok(())
}

fn run_prepare(args: &PrepareArgs) -> Result<(), ChatCloneError> {
    let start = Instant::now();
    let config = args.pipeline_config()?;

    print_header(&args.export, &args.segment, args.format.into());
    let prepared = load(&args.export, &args.segment, &config)?;
    print_summary(&prepared);

    let payload = prepared.payload(args.lora_id(), args.format.into())?;
    if let Some(output) = &args.output {
        payload.write_to(output)?;
        println!();
        println!("✅ Done! Payload saved to {}", output.display());
    } else {
        println!();
        println!("✅ Done! LoRA id: {} (use -o to save the payload)", payload.lora_id);
    }
    println!("   Total time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn run_submit(args: &SubmitArgs) -> Result<(), ChatCloneError> {
    let config = args.pipeline_config()?;
    let client = TrainingClient::new(args.backend_config()?)?;

    print_header(&args.export, &args.segment, args.format.into());
    println!("🌐 Backend: {}", client.config().base_url);
    let prepared = load(&args.export, &args.segment, &config)?;
    print_summary(&prepared);

    if prepared.segmentation.insufficient_content().is_some() && !args.force {
        println!();
        println!("⏭️  Not submitting: below the recommended word count (pass --force to submit anyway)");
        process::exit(2);
    }

    let payload = prepared.payload(args.lora_id.clone(), args.format.into())?;
    println!();
    println!("📤 Submitting LoRA {}...", payload.lora_id);
    let receipt = client.submit(&payload)?;
    println!("✅ Accepted (HTTP {})", receipt.status);
    if !receipt.body.is_empty() {
        println!("   {}", receipt.body);
    }
    Ok(())
}

fn load(
    export: &ExportArgs,
    segment: &SegmentArgs,
    config: &PipelineConfig,
) -> Result<Prepared, ChatCloneError> {
    let archive = std::fs::read(&export.archive)?;
    match segment.role_mapping()? {
        Some(roles) => prepare_with_roles(&archive, roles, config),
        None => prepare(&archive, &segment.target, config),
    }
}

fn print_header(export: &ExportArgs, segment: &SegmentArgs, format: RawTextFormat) {
    println!("📦 chatclone v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Archive: {}", export.archive.display());
    println!("🎯 Target:  {}", segment.target);
    if !segment.users.is_empty() {
        println!("👥 Users:   {}", segment.users.join(", "));
    }
    println!("📄 Format:  {}", format);
    println!();
}

fn print_summary(prepared: &Prepared) {
    let export = &prepared.export;
    let seg = &prepared.segmentation;

    for warning in &export.warnings {
        println!("⚠️  {}", warning);
    }
    if let Some(name) = &export.transcript_name {
        println!("📖 Transcript: {}", name);
    }

    println!();
    println!("📊 Summary:");
    println!("   Lines:      {}", export.stats.total_lines);
    println!(
        "   Messages:   {} ({} malformed, {} filtered)",
        export.stats.kept, export.stats.dropped_malformed, export.stats.dropped_filtered
    );
    println!("   Speakers:   {}", export.speakers.join(", "));
    println!(
        "   Roles:      User = {}, Assistant = {}",
        seg.participants.user, seg.participants.assistant
    );
    println!("   Blocks:     {}", seg.blocks.len());
    println!(
        "   Lines kept: {} ({} duplicates, {} unmapped)",
        seg.emitted_lines, seg.skipped_duplicates, seg.skipped_unmapped
    );
    println!("   Words:      {}", seg.word_count);

    if let Some(advisory) = seg.insufficient_content() {
        println!();
        println!("⚠️  Warning: {}", advisory);
    }
}
