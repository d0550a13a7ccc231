use std::error::Error;
use std::path::Path;
use std::process::ExitCode;

use log::info;
use mat_model::{ExportConfig, Material, load_config, load_materials};
use serde_json::json;

const VERSION_DATE_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

fn usage() {
    eprintln!("usage: mat-cli [--config <file>] [--stamp] <command> <args>");
    eprintln!();
    eprintln!("commands:");
    eprintln!("  summary <materials> [--json]       list materials and their models");
    eprintln!("  matml-to-mapdl <in.xml> <out.mac>  convert engineering data to MAPDL commands");
    eprintln!("  mapdl-to-matml <in.mac> <out.xml>  convert MAPDL commands to engineering data");
    eprintln!("  matml-roundtrip <in.xml> <out.xml> read and rewrite engineering data");
}

struct Options {
    config: ExportConfig,
    json: bool,
    command: String,
    paths: Vec<String>,
}

fn parse_args(args: &[String]) -> Result<Options, Box<dyn Error>> {
    let mut config_path = None;
    let mut stamp = false;
    let mut json = false;
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or("--config needs a file")?;
                config_path = Some(path.clone());
            }
            "--stamp" => stamp = true,
            "--json" => json = true,
            other if other.starts_with("--") => return Err(format!("unknown option {other}").into()),
            other => positional.push(other.to_string()),
        }
    }

    let mut config = match config_path {
        Some(path) => load_config(path)?,
        None => ExportConfig::default(),
    };
    if stamp {
        config.engineering_data_version_date =
            chrono::Local::now().format(VERSION_DATE_FORMAT).to_string();
    }
    if positional.is_empty() {
        return Err("missing command".into());
    }
    let command = positional.remove(0);
    Ok(Options {
        config,
        json,
        command,
        paths: positional,
    })
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Loads a material library, picking the codec from the file extension.
fn read_any(path: &str) -> Result<Vec<Material>, Box<dyn Error>> {
    if has_extension(path, &["xml", "matml"]) {
        Ok(mat_matml::read_matml_file(path)?)
    } else if has_extension(path, &["json"]) {
        Ok(load_materials(path)?)
    } else {
        Ok(mat_mapdl::read_file(path)?)
    }
}

fn print_summary(materials: &[Material], as_json: bool) {
    if as_json {
        let entries: Vec<_> = materials
            .iter()
            .map(|m| {
                json!({
                    "name": m.name,
                    "material_id": m.material_id,
                    "guid": m.guid,
                    "reference_temperature": m.reference_temperature,
                    "models": m.models().iter().map(|model| json!({
                        "name": model.name(),
                        "kind": format!("{:?}", model.kind()),
                        "rows": model.row_count(),
                        "parameters": model
                            .independent_parameters()
                            .iter()
                            .map(|p| p.name.clone())
                            .collect::<Vec<_>>(),
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
        return;
    }

    println!("materials: {}", materials.len());
    for material in materials {
        match material.material_id {
            Some(id) => println!("{} (id {id})", material.name),
            None => println!("{}", material.name),
        }
        for model in material.models() {
            let parameters: Vec<&str> = model
                .independent_parameters()
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            if parameters.is_empty() {
                println!("  {:?}", model.kind());
            } else {
                println!(
                    "  {:?}: {} rows over {}",
                    model.kind(),
                    model.row_count(),
                    parameters.join(", ")
                );
            }
        }
    }
}

fn run(options: &Options) -> Result<(), Box<dyn Error>> {
    let paths: Vec<&str> = options.paths.iter().map(String::as_str).collect();
    match (options.command.as_str(), paths.as_slice()) {
        ("summary", [input]) => {
            let materials = read_any(input)?;
            print_summary(&materials, options.json);
        }
        ("matml-to-mapdl", [input, output]) => {
            let materials = mat_matml::read_matml_file(input)?;
            mat_mapdl::write_mapdl_file(output, &materials, &options.config)?;
            info!("wrote {} materials to {output}", materials.len());
        }
        ("mapdl-to-matml", [input, output]) => {
            let materials = mat_mapdl::read_file(input)?;
            mat_matml::write_matml_file(output, &materials, &options.config)?;
            info!("wrote {} materials to {output}", materials.len());
        }
        ("matml-roundtrip", [input, output]) => {
            let materials = mat_matml::read_matml_file(input)?;
            mat_matml::write_matml_file(output, &materials, &options.config)?;
            info!("rewrote {} materials to {output}", materials.len());
        }
        (command, _) => return Err(format!("bad arguments for '{command}'").into()),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            usage();
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}
