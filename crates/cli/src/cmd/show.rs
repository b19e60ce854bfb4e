use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};

use casagen_lib::metadata::FieldKind;
use casagen_lib::snapshot::SnapshotStore;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_show(store: &SnapshotStore, output: OutputFormat) -> Result<()> {
  let metadata = store
    .load_current()
    .context("No metadata recorded yet; run `casagen update <descriptor>` first")?;

  if output.is_json() {
    return print_json(&metadata);
  }

  let app = &metadata.app;
  println!("{}", app.title.if_supports_color(Stream::Stdout, |s| s.bold()));
  print_stat("tagline", &app.tagline);
  print_stat("category", &app.category);
  print_stat("author", &app.author);
  print_stat("main", &app.main);
  print_stat("port_map", &app.port_map);
  println!();
  for line in app.description.lines() {
    println!("  {line}");
  }

  for (name, service) in &metadata.services {
    println!();
    println!("{}", name.if_supports_color(Stream::Stdout, |s| s.bold()));
    for kind in FieldKind::ALL {
      for field in service.fields(kind) {
        let text = if field.has_text() { field.text.as_str() } else { "(empty)" };
        println!("  {}.{}: {}", kind, field.identifier, text);
      }
    }
  }

  Ok(())
}
