use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

use classlift::bytecode::Instruction;
use classlift::classfile::ClassReader;
use classlift::config::Config;
use classlift::visit::{
    ClassHeader, ClassVisitor, FieldDeclaration, InnerClassDeclaration, MethodDeclaration,
};

#[derive(Parser)]
#[command(name = "classlift")]
#[command(about = "Relocates interface static fields into companion classes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a .class file, or every .class file under a directory
    Transform {
        /// Input .class file or directory
        #[arg(value_name = "PATH")]
        input: PathBuf,

        /// Output directory for rewritten and generated classes
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Internal name of the root object type
        #[arg(long, value_name = "NAME")]
        object_class: Option<String>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the structural declarations of a .class file
    Dump {
        /// Input .class file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Also print method instruction mnemonics
        #[arg(short, long)]
        code: bool,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Transform { input, output, object_class, verbose } => {
            transform(input, output.as_ref(), object_class.as_deref(), *verbose)?;
        }
        Commands::Dump { input, code } => {
            dump(input, *code)?;
        }
    }

    Ok(())
}

fn transform(
    input: &PathBuf,
    output: Option<&PathBuf>,
    object_class: Option<&str>,
    verbose: bool,
) -> Result<()> {
    let config = match object_class {
        Some(name) => Config::with_object_class(name),
        None => Config::default(),
    };

    let default_output = PathBuf::from(".");
    let output_dir = output.unwrap_or(&default_output);
    if !output_dir.exists() {
        fs::create_dir_all(output_dir)?;
    }
    let output_str = output_dir.to_string_lossy();

    if input.is_dir() {
        let written =
            classlift::transform_tree(&input.to_string_lossy(), &output_str, &config)?;
        if verbose {
            println!("{} class file(s) written to {}", written, output_dir.display());
        }
    } else {
        classlift::transform_file(&input.to_string_lossy(), &output_str, &config)?;
        if verbose {
            println!("transformed {} into {}", input.display(), output_dir.display());
        }
    }

    Ok(())
}

fn dump(input: &PathBuf, code: bool) -> Result<()> {
    let bytes = fs::read(input)?;
    let mut printer = DumpVisitor { code };
    ClassReader::new(&bytes).accept(&mut printer)?;
    Ok(())
}

/// Prints each traversal event as it arrives.
struct DumpVisitor {
    code: bool,
}

impl ClassVisitor for DumpVisitor {
    fn visit_header(&mut self, header: ClassHeader) -> classlift::Result<()> {
        println!(
            "class {} (version {}.{}, access 0x{:04x})",
            header.name, header.major_version, header.minor_version, header.access_flags
        );
        if let Some(super_name) = &header.super_name {
            println!("  extends {}", super_name);
        }
        for interface in &header.interfaces {
            println!("  implements {}", interface);
        }
        Ok(())
    }

    fn visit_field(&mut self, field: FieldDeclaration) -> classlift::Result<()> {
        println!(
            "  field {} {} (access 0x{:04x})",
            field.name, field.descriptor, field.access_flags
        );
        if let Some(constant) = &field.constant_value {
            println!("    constant value {:?}", constant);
        }
        Ok(())
    }

    fn visit_method(&mut self, method: MethodDeclaration) -> classlift::Result<()> {
        println!(
            "  method {}{} (access 0x{:04x})",
            method.name, method.descriptor, method.access_flags
        );
        if self.code {
            if let Some(body) = &method.body {
                for insn in &body.instructions {
                    match insn {
                        Instruction::Label(label) => println!("    {:?}:", label),
                        Instruction::Field { owner, name, descriptor, .. } => {
                            println!("    {} {}.{}:{}", insn.mnemonic(), owner, name, descriptor)
                        }
                        Instruction::Method { owner, name, descriptor, .. } => {
                            println!("    {} {}.{}{}", insn.mnemonic(), owner, name, descriptor)
                        }
                        other => println!("    {}", other.mnemonic()),
                    }
                }
            }
        }
        Ok(())
    }

    fn visit_inner_class(&mut self, inner_class: InnerClassDeclaration) -> classlift::Result<()> {
        println!(
            "  inner class {} (access 0x{:04x})",
            inner_class.name, inner_class.access_flags
        );
        Ok(())
    }

    fn visit_end(&mut self) -> classlift::Result<()> {
        Ok(())
    }
}
