/// Add a class attribute to every tag of an HTML file while it is being parsed, then write the
/// prettified document to another file.
///
/// Usage:
///
/// ```sh
/// printf '<p>Hello</p><p>World</p>' > input.html
/// cargo run --example add_class -- input.html output.html
/// cat output.html
/// ```
///
/// Output:
///
/// ```text
/// <p class="test">
///  Hello
/// </p>
/// <p class="test">
///  World
/// </p>
/// ```
use std::cell::Cell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use argh::FromArgs;
use soupswap::{Soup, SoupReplacer};

/// Read an HTML file and set a class on every tag during parsing.
#[derive(FromArgs)]
struct Cli {
    /// the class to set, overwriting any existing one.
    #[argh(option, default = "String::from(\"test\")")]
    class: String,

    /// only touch tags with this name, like "p"
    #[argh(option)]
    only: Option<String>,

    /// the HTML file to read
    #[argh(positional)]
    input: PathBuf,

    /// where to write the prettified result
    #[argh(positional)]
    output: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli: Cli = argh::from_env();

    let html = fs::read_to_string(&cli.input)?;

    let class = cli.class;
    let only = cli.only;
    let changed = Rc::new(Cell::new(0usize));
    let counter = changed.clone();
    let mut replacer = SoupReplacer::new().side_effect(move |tag| {
        if only.as_deref().map_or(true, |name| tag.name == name) {
            tag.attributes.insert("class".to_owned(), class.clone());
            counter.set(counter.get() + 1);
        }
    });

    let soup = Soup::parse_with(&html, &mut replacer)?;

    let mut out = BufWriter::new(File::create(&cli.output)?);
    write!(out, "{}", soup.pretty())?;
    out.flush()?;

    println!(
        "Set the class attribute on {} tags, written to {}.",
        changed.get(),
        cli.output.display()
    );
    Ok(())
}
