use std::env;
use std::process::ExitCode;

use epub_xhtml::{
    Block, BookModel, DirectoryStore, ParagraphItem, ReaderLimits, TagActionRegistry, XhtmlReader,
};

#[derive(Clone, Debug)]
struct Args {
    root: String,
    chapters: Vec<String>,
    cover: bool,
    items: bool,
    limits: ReaderLimits,
}

fn main() -> ExitCode {
    match run(env::args().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("error: {}", msg);
            eprintln!("{}", help_text());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Vec<String>) -> Result<(), String> {
    let cli = parse_args(args)?;
    let registry = TagActionRegistry::build();
    let store = DirectoryStore::new(&cli.root);
    let mut reader = XhtmlReader::with_limits(cli.limits);
    if cli.cover {
        reader.set_mark_first_image_as_cover();
    }
    let mut model = BookModel::new();
    for chapter in &cli.chapters {
        reader
            .read_file(&registry, &store, &mut model, chapter, chapter)
            .map_err(|e| e.to_string())?;
    }

    for (index, block) in model.blocks().iter().enumerate() {
        match block {
            Block::SectionBreak => println!("{:>5}  ----", index),
            Block::Paragraph(paragraph) if cli.items => {
                println!("{:>5}  {:?}", index, paragraph.text());
                for item in &paragraph.items {
                    if !matches!(item, ParagraphItem::Text(_)) {
                        println!("       {:?}", item);
                    }
                }
            }
            Block::Paragraph(paragraph) => println!("{:>5}  {}", index, paragraph.text()),
        }
    }

    println!();
    for (path, alias) in reader.aliases().iter() {
        println!("alias {} = {}", alias, path);
    }
    for (label, block) in model.labels() {
        println!("label {} -> {}", label, block);
    }
    for name in model.images().keys() {
        println!("image {}", name);
    }
    if let Some(cover) = model.cover_image() {
        println!("cover {}", cover);
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Args, String> {
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h") {
        return Err("help requested".to_string());
    }

    let mut cfg = Args {
        root: String::new(),
        chapters: Vec::new(),
        cover: false,
        items: false,
        limits: ReaderLimits::default(),
    };
    let mut positional = Vec::new();
    let mut i = 1usize;
    while i < args.len() {
        match args[i].as_str() {
            "--cover" => cfg.cover = true,
            "--items" => cfg.items = true,
            "--max-document-bytes" => {
                i += 1;
                cfg.limits.max_document_bytes = parse_usize(args.get(i), "--max-document-bytes")?;
            }
            "--max-css-bytes" => {
                i += 1;
                cfg.limits.max_css_bytes = parse_usize(args.get(i), "--max-css-bytes")?;
            }
            flag if flag.starts_with("--") => return Err(format!("unknown flag {}", flag)),
            value => positional.push(value.to_string()),
        }
        i += 1;
    }

    let mut positional = positional.into_iter();
    cfg.root = positional
        .next()
        .ok_or_else(|| "missing <book-root>".to_string())?;
    cfg.chapters = positional.collect();
    if cfg.chapters.is_empty() {
        return Err("missing <chapter>".to_string());
    }
    Ok(cfg)
}

fn parse_usize(value: Option<&String>, flag: &str) -> Result<usize, String> {
    value
        .ok_or_else(|| format!("{} needs a value", flag))?
        .parse::<usize>()
        .map_err(|e| format!("{}: {}", flag, e))
}

fn help_text() -> &'static str {
    "usage: xhtml-dump <book-root> <chapter>... [--cover] [--items]
                  [--max-document-bytes N] [--max-css-bytes N]

Converts chapters (paths relative to <book-root>) in order and prints the
resulting blocks, file aliases, labels and images."
}
