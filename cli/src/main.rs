//! docx2pdf CLI - Word to PDF conversion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use docx2pdf::{
    convert_with_options, parse_file_with_options, BlockOrder, ConvertOptions, FontFamily,
    JsonFormat, MediaStorage, PageLayout, ParseOptions, RenderOptions,
};

#[derive(Parser)]
#[command(name = "docx2pdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Convert Word (.docx) documents to PDF", long_about = None)]
struct Cli {
    /// Input DOCX file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output PDF file (defaults to the input name with a .pdf extension)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a DOCX file to PDF
    Convert {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Block ordering on the page
        #[arg(long, value_enum, default_value = "document")]
        order: OrderMode,

        /// Where extracted media is staged
        #[arg(long, value_enum, default_value = "memory", env = "DOCX2PDF_MEDIA")]
        media: MediaMode,

        /// Base font family
        #[arg(long, value_enum, default_value = "helvetica")]
        font: FontMode,

        /// Page size
        #[arg(long, value_enum, default_value = "a4")]
        page: PageMode,

        /// Parse markup and extract media on a single thread
        #[arg(long)]
        sequential: bool,

        /// Write uncompressed content streams
        #[arg(long)]
        uncompressed: bool,
    },

    /// Extract plain text
    Text {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Dump the parsed document tree as JSON
    Json {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show document information
    Info {
        /// Input DOCX file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OrderMode {
    /// Source order
    Document,
    /// Paragraphs, then tables, then images
    Grouped,
}

impl From<OrderMode> for BlockOrder {
    fn from(mode: OrderMode) -> Self {
        match mode {
            OrderMode::Document => BlockOrder::Document,
            OrderMode::Grouped => BlockOrder::Grouped,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MediaMode {
    /// Keep media in memory
    Memory,
    /// Stage media in a scoped temporary directory
    Temp,
}

impl From<MediaMode> for MediaStorage {
    fn from(mode: MediaMode) -> Self {
        match mode {
            MediaMode::Memory => MediaStorage::Memory,
            MediaMode::Temp => MediaStorage::TempDir,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum FontMode {
    Helvetica,
    Courier,
}

impl From<FontMode> for FontFamily {
    fn from(mode: FontMode) -> Self {
        match mode {
            FontMode::Helvetica => FontFamily::Helvetica,
            FontMode::Courier => FontFamily::Courier,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum PageMode {
    A4,
    Letter,
}

impl From<PageMode> for PageLayout {
    fn from(mode: PageMode) -> Self {
        match mode {
            PageMode::A4 => PageLayout::a4(),
            PageMode::Letter => PageLayout::letter(),
        }
    }
}

struct ConvertArgs {
    order: OrderMode,
    media: MediaMode,
    font: FontMode,
    page: PageMode,
    sequential: bool,
    uncompressed: bool,
}

impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            order: OrderMode::Document,
            media: MediaMode::Memory,
            font: FontMode::Helvetica,
            page: PageMode::A4,
            sequential: false,
            uncompressed: false,
        }
    }
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        let mut parse = ParseOptions::new().with_media_storage(self.media.into());
        if self.sequential {
            parse = parse.sequential();
        }

        let render = RenderOptions::new()
            .with_block_order(self.order.into())
            .with_font_family(self.font.into())
            .with_layout(self.page.into())
            .with_compression(!self.uncompressed);

        ConvertOptions::new()
            .with_parse_options(parse)
            .with_render_options(render)
            .with_stats(true)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            order,
            media,
            font,
            page,
            sequential,
            uncompressed,
        }) => {
            let args = ConvertArgs {
                order,
                media,
                font,
                page,
                sequential,
                uncompressed,
            };
            cmd_convert(&input, output.as_deref(), &args)
        }
        Some(Commands::Text { input, output }) => cmd_text(&input, output.as_deref()),
        Some(Commands::Json {
            input,
            output,
            compact,
        }) => cmd_json(&input, output.as_deref(), compact),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &ConvertArgs::default())
            } else {
                println!("{}", "Usage: docx2pdf <FILE> [OUTPUT]".yellow());
                println!("       docx2pdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("pdf")
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    args: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));

    log::info!("converting {} -> {}", input.display(), output.display());
    let data = fs::read(input)?;
    let result = convert_with_options(&data, &args.options())?;
    fs::write(&output, &result.content)?;

    println!("{} {}", "Saved to".green(), output.display());
    if let Some(stats) = result.stats {
        println!(
            "  {} {} pages, {} paragraphs, {} tables",
            "├─".dimmed(),
            stats.page_count,
            stats.paragraph_count,
            stats.table_count
        );
        println!(
            "  {} {} images drawn, {} skipped",
            "└─".dimmed(),
            stats.images_drawn,
            stats.images_skipped
        );
        if stats.images_skipped > 0 {
            println!(
                "{}",
                "Some images could not be resolved or decoded (see RUST_LOG=warn)".yellow()
            );
        }
    }

    Ok(())
}

fn cmd_text(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = docx2pdf::extract_text(input)?;

    if let Some(path) = output {
        fs::write(path, &text)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", text);
    }

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = docx2pdf::to_json(input, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let parsed = parse_file_with_options(input, ParseOptions::new())?;
    let doc = &parsed.document;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref subject) = doc.metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref keywords) = doc.metadata.keywords {
        println!("{}: {}", "Keywords".bold(), keywords);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }
    if let Some(ref modified) = doc.metadata.modified {
        println!("{}: {}", "Modified".bold(), modified);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = doc.plain_text();
    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs().count());
    println!("{}: {}", "Tables".bold(), doc.tables().count());
    println!("{}: {}", "Images".bold(), doc.images().count());
    println!("{}: {}", "Media entries".bold(), parsed.media.len());
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docx2pdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Word to PDF conversion tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docx2pdf".dimmed());
    println!("License: MIT");
}
