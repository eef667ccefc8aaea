use std::fs;
use std::path::Path;

use clap::CommandFactory;

// cli.rs only needs clap, clap_complete and humantime, all of which are
// build-dependencies.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR not set by Cargo");
    let man_dir = Path::new(&out_dir).join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    write_manpages(&cli::Cli::command(), &man_dir);
}

/// Write `fmcctl.1` plus one page per visible subcommand, named
/// `fmcctl-<sub>-<subsub>.1`.
fn write_manpages(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();
    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut page)
        .unwrap_or_else(|e| panic!("rendering man page for `{name}`: {e}"));

    let path = dir.join(format!("{name}.1"));
    fs::write(&path, page).unwrap_or_else(|e| panic!("writing {}: {e}", path.display()));

    cmd.get_subcommands()
        .filter(|sub| !sub.is_hide_set())
        .for_each(|sub| {
            let qualified = sub.clone().name(format!("{name}-{}", sub.get_name()));
            write_manpages(&qualified, dir);
        });
}
