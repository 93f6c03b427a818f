//! Product command handlers.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tracing::debug;

use catalog_core::{
    FieldError, FormSession, Pagination, Product, ProductFilter, ProductForm, ProductRepository,
};

use crate::cli::{CreateArgs, GlobalOpts, ListArgs, OutputFormat, ProductFields, UpdateArgs};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Released")]
    released: String,
    #[tabled(rename = "Revision")]
    revision: String,
}

fn row(p: &Arc<Product>) -> ProductRow {
    ProductRow {
        id: p.id.clone(),
        name: p.name.clone(),
        description: p.description.clone(),
        released: p.date_release.format("%Y-%m-%d").to_string(),
        revision: p.date_revision.format("%Y-%m-%d").to_string(),
    }
}

fn detail(p: &Arc<Product>, color: bool) -> String {
    let rows = [
        ("ID", p.id.clone()),
        ("Name", p.name.clone()),
        ("Description", p.description.clone()),
        ("Logo", p.logo.clone()),
        ("Released", p.date_release.format("%Y-%m-%d").to_string()),
        ("Revision", p.date_revision.format("%Y-%m-%d").to_string()),
    ];
    rows.iter()
        .map(|(label, value)| {
            let label = format!("{label:<12}");
            if color {
                format!("{}{value}", label.bold())
            } else {
                format!("{label}{value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Field input ──────────────────────────────────────────────────────

/// Field values supplied on the command line or in a `--from-file` JSON
/// document. Absent values leave the form untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FormPatch {
    id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    logo: Option<String>,
    date_release: Option<String>,
}

impl FormPatch {
    fn collect(id: Option<String>, fields: ProductFields) -> Result<Self, CliError> {
        let file = match fields.from_file {
            Some(ref path) => util::read_json_file::<FormPatch>(path)?,
            None => FormPatch::default(),
        };
        Ok(Self {
            id: id.or(file.id),
            name: fields.name.or(file.name),
            description: fields.description.or(file.description),
            logo: fields.logo.or(file.logo),
            date_release: fields.release.or(file.date_release),
        })
    }

    fn apply(self, form: &mut ProductForm) {
        if let Some(id) = self.id {
            form.id = id;
        }
        if let Some(name) = self.name {
            form.name = name;
        }
        if let Some(description) = self.description {
            form.description = description;
        }
        if let Some(logo) = self.logo {
            form.logo = logo;
        }
        if let Some(date) = self.date_release {
            form.set_release_date(date);
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

pub async fn list<R: ProductRepository>(
    ctx: &Context<R>,
    args: ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let products = ctx.use_cases.get_products().await?;
    let filter = args
        .search
        .as_deref()
        .map_or(ProductFilter::All, ProductFilter::search);
    let matching = filter.apply(&products);

    let mut pagination = if args.all {
        Pagination::new(matching.len())
    } else {
        Pagination::new(args.per_page)
    };
    pagination.go_to(args.page, matching.len());
    let page = pagination.slice(&matching);
    debug!(
        total = products.len(),
        matching = matching.len(),
        page = pagination.page(),
        "listing products"
    );

    let out = output::render_list(&global.output, page, row, |p| p.id.clone())?;
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        eprintln!(
            "{} result(s), page {} of {}",
            matching.len(),
            pagination.page(),
            pagination.total_pages(matching.len())
        );
    }
    Ok(())
}

pub async fn get<R: ProductRepository>(
    ctx: &Context<R>,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ctx.use_cases.get_products().await?;
    let product = ctx
        .use_cases
        .get_product(id)
        .await?
        .ok_or_else(|| CliError::NotFound {
            resource_type: "product".into(),
            identifier: id.into(),
        })?;

    let out = output::render_single(
        &global.output,
        &product,
        |p| detail(p, ctx.color),
        |p| p.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn create<R: ProductRepository>(
    ctx: &Context<R>,
    args: CreateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut session = FormSession::create(
        ctx.use_cases.clone(),
        ctx.notifications.clone(),
        ctx.debounce,
    );
    FormPatch::collect(args.id, args.fields)?.apply(session.form_mut());

    if let Ok(Some(FieldError::AlreadyExists)) = session.check_id().await {
        return Err(CliError::Conflict {
            resource_type: "product".into(),
            identifier: session.form().id.trim().to_owned(),
        });
    }

    let saved = session.submit(util::today()).await?;
    print_saved(&saved, ctx, global)
}

pub async fn update<R: ProductRepository>(
    ctx: &Context<R>,
    args: UpdateArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ctx.use_cases.get_products().await?;
    let mut session = FormSession::edit(
        ctx.use_cases.clone(),
        ctx.notifications.clone(),
        ctx.debounce,
        &args.id,
    )
    .await?;
    FormPatch::collect(None, args.fields)?.apply(session.form_mut());

    let saved = session.submit(util::today()).await?;
    print_saved(&saved, ctx, global)
}

pub async fn delete<R: ProductRepository>(
    ctx: &Context<R>,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let prompt = format!("Delete product '{id}'?");
    if !util::confirm("delete", &prompt, global.yes)? {
        return Err(CliError::Aborted);
    }
    ctx.use_cases
        .delete_and_notify(id, &ctx.notifications)
        .await?;
    Ok(())
}

#[derive(Serialize)]
struct Verification<'a> {
    id: &'a str,
    exists: bool,
}

pub async fn verify<R: ProductRepository>(
    ctx: &Context<R>,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let exists = ctx.use_cases.verify_product_id(id).await?;
    let result = Verification { id, exists };

    let out = output::render_single(
        &global.output,
        &result,
        |v| {
            if v.exists {
                format!("'{}' is taken", v.id)
            } else {
                format!("'{}' is available", v.id)
            }
        },
        |v| v.exists.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_saved<R: ProductRepository>(
    saved: &Arc<Product>,
    ctx: &Context<R>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output,
        saved,
        |p| detail(p, ctx.color),
        |p| p.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
