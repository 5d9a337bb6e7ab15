//! Product command handlers.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tabled::Tabled;

use finprod_core::form::validation::{self, FieldError};
use finprod_core::{
    Command as CoreCommand, CommandResult, Controller, Field, Product, ProductForm, ProductList,
};

use crate::cli::{CreateArgs, GlobalOpts, ListArgs, ProductsArgs, ProductsCommand, UpdateArgs};
use crate::config::{self, Config};
use crate::error::{self, CliError};
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Logo")]
    logo: String,
    #[tabled(rename = "Nombre del producto")]
    name: String,
    #[tabled(rename = "Descripción")]
    description: String,
    #[tabled(rename = "Fecha de liberación")]
    date_release: String,
    #[tabled(rename = "Fecha de reestructuración")]
    date_revision: String,
}

impl From<&Arc<Product>> for ProductRow {
    fn from(p: &Arc<Product>) -> Self {
        Self {
            id: p.id.clone(),
            logo: p.initials(),
            name: p.name.clone(),
            description: p.description.clone(),
            date_release: validation::format_date(p.date_release),
            date_revision: validation::format_date(p.date_revision),
        }
    }
}

fn detail(p: &Arc<Product>, color: bool) -> String {
    let mut out = String::new();
    let rows = [
        ("ID", p.id.clone()),
        ("Nombre", p.name.clone()),
        ("Descripción", p.description.clone()),
        ("Logo", p.logo.clone()),
        ("Fecha Liberación", validation::format_date(p.date_release)),
        ("Fecha Revisión", validation::format_date(p.date_revision)),
    ];
    for (name, value) in rows {
        let _ = writeln!(out, "{:<18} {value}", output::label(name, color));
    }
    out.trim_end().to_owned()
}

#[derive(Serialize)]
struct VerifyResult {
    id: String,
    exists: bool,
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ProductsArgs,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color());

    match args.command {
        ProductsCommand::List(list) => {
            let page_size = config::page_size(global, cfg, list.page_size)?;
            util::connect(controller, global).await?;
            list_products(controller, &list, page_size, global, color)
        }

        ProductsCommand::Get { id } => {
            util::connect(controller, global).await?;
            let product = controller.product(&id).ok_or_else(|| error::not_found(&id))?;
            let out = output::render_single(
                &global.output(),
                &product,
                |p| detail(p, color),
                |p| p.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::Create(create) => create_product(controller, create, global, color).await,

        ProductsCommand::Update(update) => update_product(controller, update, global, color).await,

        ProductsCommand::Delete { id } => {
            let prompt = format!("¿Estás seguro de eliminar el producto {id}?");
            if !util::confirm(&prompt, global.yes, "products delete")? {
                return Ok(());
            }
            util::connect(controller, global).await?;
            if let CommandResult::Deleted { message, .. } = controller
                .execute(CoreCommand::DeleteProduct { id: id.clone() })
                .await?
            {
                output::success(&message, color, global.quiet);
            }
            Ok(())
        }

        ProductsCommand::Verify { id } => {
            util::connect(controller, global).await?;
            let exists = controller.verify_id(&id).await?;
            let result = VerifyResult { id, exists };
            let out = output::render_single(
                &global.output(),
                &result,
                |r| {
                    if r.exists {
                        format!("{}: {}", r.id, FieldError::IdExists)
                    } else {
                        format!("{}: disponible", r.id)
                    }
                },
                |r| r.exists.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

fn list_products(
    controller: &Controller,
    args: &ListArgs,
    page_size: usize,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let mut list = ProductList::new(page_size);
    list.set_products(controller.products());
    if let Some(ref term) = args.search {
        list.apply_search(term);
    }

    if args.all {
        list.set_page_size(list.total());
    } else {
        let pages = list.pagination().page_count().max(1);
        if args.page == 0 || args.page > pages {
            return Err(CliError::Validation {
                field: "page".into(),
                reason: format!("page {} out of range (1-{pages})", args.page),
            });
        }
        list.go_to_page(args.page);
    }

    let format = global.output();
    let out = output::render_list(
        &format,
        list.page_items(),
        |p| ProductRow::from(p),
        |p| p.id.clone(),
    )?;
    output::print_output(&out, global.quiet);

    if matches!(format, crate::cli::OutputFormat::Table) {
        let pagination = list.pagination();
        output::note(
            &format!(
                "{} · página {}/{}",
                list.display_range(),
                pagination.page(),
                pagination.page_count().max(1)
            ),
            color,
            global.quiet,
        );
    }
    Ok(())
}

// ── Create / update ─────────────────────────────────────────────────

/// Sync form errors, formatted one per line.
fn form_errors(form: &ProductForm) -> Result<(), CliError> {
    let errors = form.errors();
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .iter()
        .map(|(field, err)| format!("{field}: {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    Err(CliError::InvalidForm { details })
}

async fn create_product(
    controller: &Controller,
    args: CreateArgs,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let mut form = ProductForm::new_create(Local::now().date_naive());
    form.set_value(Field::Id, args.id.trim());
    form.set_value(Field::Name, args.name);
    form.set_value(Field::Description, args.description);
    form.set_value(Field::Logo, args.logo);
    form.set_value(Field::DateRelease, args.release);

    let release_parses = validation::parse_date(form.value(Field::DateRelease)).is_some();
    let revision_differs = args
        .revision
        .as_deref()
        .is_some_and(|r| r.trim() != form.value(Field::DateRevision));
    if release_parses && revision_differs {
        return Err(CliError::Validation {
            field: Field::DateRevision.to_string(),
            reason: FieldError::RevisionMismatch.to_string(),
        });
    }

    form.mark_all_touched();
    form_errors(&form)?;

    util::connect(controller, global).await?;

    let id = form.value(Field::Id).to_owned();
    if let Some(ticket) = form.request_id_check(&id) {
        let answer = controller.verify_id(&ticket.id).await;
        form.apply_id_check(&ticket, answer);
    }
    if let Some(err) = form.error(Field::Id) {
        return Err(CliError::Validation {
            field: Field::Id.to_string(),
            reason: err.to_string(),
        });
    }

    let draft = form.submit().ok_or_else(|| CliError::InvalidForm {
        details: "El formulario no es válido".into(),
    })?;
    let result = controller.execute(CoreCommand::CreateProduct(draft)).await;
    form.set_submitting(false);

    if let CommandResult::Product(product) = result? {
        output::success(&format!("Producto {} creado", product.id), color, global.quiet);
        print_product(&Arc::new(product), global, color)?;
    }
    Ok(())
}

async fn update_product(
    controller: &Controller,
    args: UpdateArgs,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    util::connect(controller, global).await?;
    let existing = controller
        .product(&args.id)
        .ok_or_else(|| error::not_found(&args.id))?;

    let mut form = ProductForm::new_edit(existing, Local::now().date_naive());
    let edits = [
        (Field::Name, args.name),
        (Field::Description, args.description),
        (Field::Logo, args.logo),
        (Field::DateRelease, args.release),
    ];
    for (field, value) in edits {
        if let Some(value) = value {
            form.set_value(field, value);
        }
    }

    form.mark_all_touched();
    form_errors(&form)?;

    let draft = form.submit().ok_or_else(|| CliError::InvalidForm {
        details: "El formulario no es válido".into(),
    })?;
    let result = controller
        .execute(CoreCommand::UpdateProduct {
            id: draft.id.clone(),
            changes: draft.changes(),
        })
        .await;
    form.set_submitting(false);

    if let CommandResult::Product(product) = result? {
        output::success(
            &format!("Producto {} actualizado", product.id),
            color,
            global.quiet,
        );
        print_product(&Arc::new(product), global, color)?;
    }
    Ok(())
}

fn print_product(product: &Arc<Product>, global: &GlobalOpts, color: bool) -> Result<(), CliError> {
    let out = output::render_single(
        &global.output(),
        product,
        |p| detail(p, color),
        |p| p.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn product() -> Arc<Product> {
        Arc::new(Product {
            id: "trj-crd".into(),
            name: "Tarjeta Crédito".into(),
            description: "Tarjeta de consumo bajo la modalidad de crédito".into(),
            logo: "https://example.com/logo.png".into(),
            date_release: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            date_revision: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        })
    }

    #[test]
    fn row_shows_initials_instead_of_logo() {
        let row = ProductRow::from(&product());
        assert_eq!(row.logo, "TC");
        assert_eq!(row.date_release, "2025-01-01");
        assert_eq!(row.date_revision, "2026-01-01");
    }

    #[test]
    fn detail_view_lists_every_field() {
        insta::assert_snapshot!(detail(&product(), false), @r"
        ID                 trj-crd
        Nombre             Tarjeta Crédito
        Descripción        Tarjeta de consumo bajo la modalidad de crédito
        Logo               https://example.com/logo.png
        Fecha Liberación   2025-01-01
        Fecha Revisión     2026-01-01
        ");
    }

    #[test]
    fn empty_form_reports_every_required_field() {
        let mut form = ProductForm::new_create(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        form.mark_all_touched();
        let Err(CliError::InvalidForm { details }) = form_errors(&form) else {
            panic!("expected invalid form");
        };
        assert_eq!(details.lines().count(), 6);
        assert!(details.starts_with("ID: El ID es requerido"));
    }
}
