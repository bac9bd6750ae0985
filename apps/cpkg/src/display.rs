//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use cpkg_builder::RecipeSpec;
use cpkg_types::{BuildReport, ColorChoice, OptionSet, PackageReference, Setting};
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// What a recipe declares, as shown by `cpkg inspect`
#[derive(Debug, Clone, Serialize)]
pub struct RecipeSummary {
    pub reference: PackageReference,
    pub description: String,
    pub license: String,
    pub homepage: String,
    pub source: String,
    pub settings: Vec<Setting>,
    pub requires: Vec<PackageReference>,
    pub options: OptionSet,
    pub libs: Vec<String>,
    pub system_libs: Vec<String>,
}

impl From<&RecipeSpec> for RecipeSummary {
    fn from(recipe: &RecipeSpec) -> Self {
        Self {
            reference: recipe.reference(),
            description: recipe.metadata.description.clone(),
            license: recipe.metadata.license.clone(),
            homepage: recipe.metadata.homepage.clone(),
            source: recipe.clone_url(),
            settings: recipe.settings.clone(),
            requires: recipe.requires.clone(),
            options: recipe.options.clone(),
            libs: recipe.linkage.names(),
            system_libs: recipe.linkage.system_libs().map(str::to_string).collect(),
        }
    }
}

/// Result of one CLI command
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CommandResult {
    Inspect(RecipeSummary),
    Source { source_dir: PathBuf },
    Create(BuildReport),
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render command result
    pub fn render_result(&self, result: &CommandResult) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        match result {
            CommandResult::Inspect(summary) => self.render_summary(summary),
            CommandResult::Source { source_dir } => {
                println!(
                    "{} {}",
                    self.style(Style::new().green().bold()).apply_to("Patched sources:"),
                    source_dir.display()
                );
                Ok(())
            }
            CommandResult::Create(report) => self.render_build_report(report),
        }
    }

    fn render_summary(&self, summary: &RecipeSummary) -> io::Result<()> {
        let bold = self.style(Style::new().bold());
        println!("{}", bold.apply_to(&summary.reference));
        if !summary.description.is_empty() {
            println!("{}", summary.description);
        }
        println!("License:  {}", summary.license);
        println!("Homepage: {}", summary.homepage);
        println!("Source:   {}", summary.source);

        let settings: Vec<&str> = summary.settings.iter().map(|s| s.as_str()).collect();
        println!("Settings: {}", settings.join(", "));

        let requires: Vec<String> = summary.requires.iter().map(ToString::to_string).collect();
        println!(
            "Requires: {}",
            if requires.is_empty() {
                "-".to_string()
            } else {
                requires.join(", ")
            }
        );
        println!("Libs:     {}", summary.libs.join(" "));

        if !summary.options.is_empty() {
            println!();
            let mut table = self.table();
            table.set_header(vec![
                Cell::new("Option").add_attribute(Attribute::Bold),
                Cell::new("Value").add_attribute(Attribute::Bold),
            ]);
            for (name, value) in summary.options.iter() {
                table.add_row(vec![Cell::new(name), Cell::new(value.cmake_value())]);
            }
            println!("{table}");
        }

        Ok(())
    }

    fn render_build_report(&self, report: &BuildReport) -> io::Result<()> {
        println!(
            "{} {} ({})",
            self.style(Style::new().green().bold()).apply_to("Built"),
            report.reference,
            report.package_id
        );
        println!("Package:  {}", report.package_dir.display());
        println!("Metadata: {}", report.metadata_path.display());
        println!("Libs:     {}", report.libs.join(" "));

        let mut table = self.table();
        table.set_header(vec![
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Kind").add_attribute(Attribute::Bold),
        ]);
        for header in &report.headers {
            table.add_row(vec![
                Cell::new(header.display()),
                self.colored_cell("header", Color::Cyan),
            ]);
        }
        for archive in &report.archives {
            table.add_row(vec![
                Cell::new(archive.display()),
                self.colored_cell("archive", Color::Green),
            ]);
        }
        println!("{table}");

        println!(
            "Completed in {:.1}s",
            std::time::Duration::from_millis(report.duration_ms).as_secs_f64()
        );
        Ok(())
    }

    fn table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if !self.colors_enabled() {
            table.force_no_tty();
        }
        table
    }

    fn colored_cell(&self, text: &str, color: Color) -> Cell {
        if self.colors_enabled() {
            Cell::new(text).fg(color)
        } else {
            Cell::new(text)
        }
    }

    fn style(&self, style: Style) -> Style {
        style.force_styling(self.colors_enabled())
    }

    /// Check if colors should be used
    fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

