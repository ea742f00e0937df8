use serde::Serialize;

use crate::cli::Context;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

#[derive(Serialize)]
struct CategoryListOutput {
    categories: Vec<String>,
    choices: Vec<String>,
}

#[derive(Serialize)]
struct CategoryChangeOutput<'a> {
    name: &'a str,
    categories: Vec<String>,
}

pub fn run_list(ctx: &Context) -> Result<()> {
    let store = ctx.book.categories();
    let categories = store.list()?;
    let choices = store.pick_list()?;

    let header = if categories.is_empty() {
        "No categories".to_string()
    } else {
        format!("Categories ({})", categories.len())
    };
    let mut human = HumanOutput::new(header);
    for name in &categories {
        human.push_detail(name.clone());
    }

    let output = CategoryListOutput {
        categories,
        choices,
    };
    emit_success(ctx.output, "category list", &output, Some(&human))
}

pub fn run_add(ctx: &Context, name: &str) -> Result<()> {
    let categories = ctx.book.categories().create(name)?;
    let name = name.trim();

    let mut human = HumanOutput::new("Category added");
    human.push_summary("Name", name);
    human.push_summary("Total", categories.len().to_string());
    emit_success(
        ctx.output,
        "category add",
        &CategoryChangeOutput { name, categories },
        Some(&human),
    )
}

pub fn run_rm(ctx: &Context, name: &str) -> Result<()> {
    let categories = ctx.book.categories().delete(name)?;

    let mut human = HumanOutput::new("Category deleted");
    human.push_summary("Name", name);
    human.push_warning("tasks already using this category keep their label");
    emit_success(
        ctx.output,
        "category rm",
        &CategoryChangeOutput { name, categories },
        Some(&human),
    )
}
