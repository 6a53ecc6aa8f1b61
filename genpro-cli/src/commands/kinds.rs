//! `genpro kinds`: list output styles and their bindings

use console::style;
use genpro::scaffold::RendererRegistry;

pub struct KindsCommand;

impl KindsCommand {
    pub fn execute() {
        let registry = RendererRegistry::with_defaults();

        for name in registry.styles() {
            let kinds = registry.bound_kinds(name).unwrap_or_default();
            let aliases: Vec<_> = registry
                .aliases()
                .filter(|(_, target)| *target == name)
                .map(|(alias, _)| alias)
                .collect();

            print!("{}", style(name).green().bold());
            if !aliases.is_empty() {
                print!(" {}", style(format!("(alias: {})", aliases.join(", "))).dim());
            }
            println!();
            for kind in kinds {
                println!("  {} {}", kind, style(format!("→ {}/", kind.package())).dim());
            }
        }
    }
}
