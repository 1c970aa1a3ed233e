//! Product command handlers.

use std::path::PathBuf;

use tabled::Tabled;

use stockroom_core::{
    Catalog, CreateProductRequest, FavoriteSet, ImageAttachment, Product, UpdateProductRequest,
    parse_price, parse_quantity,
};

use crate::cli::{CreateArgs, GlobalOpts, ProductsArgs, ProductsCommand, UpdateArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct ProductRow {
    #[tabled(rename = "")]
    favorite: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "SKU")]
    sku: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Qty")]
    quantity: u32,
}

impl ProductRow {
    pub(crate) fn new(p: &Product, favorites: &FavoriteSet) -> Self {
        Self {
            favorite: output::favorite_marker(favorites.contains(&p.id)),
            id: p.id.to_string(),
            sku: p.sku.clone(),
            name: p.name.clone(),
            price: p.display_price(),
            quantity: p.quantity,
        }
    }
}

fn detail(p: &Product, favorites: &FavoriteSet) -> String {
    let mut lines = vec![
        format!("ID:          {}", p.id),
        format!("SKU:         {}", p.sku),
        format!("Name:        {}", p.name),
        format!("Price:       {}", p.display_price()),
        format!("Quantity:    {}", p.quantity),
        format!(
            "Favorite:    {}",
            if favorites.contains(&p.id) { "yes" } else { "no" }
        ),
        format!("Thumbnail:   {}", p.cover_image().unwrap_or("-")),
    ];
    if !p.images.is_empty() {
        lines.push(format!("Images:      {}", p.images.join(", ")));
    }
    if let Some(at) = p.updated_at.or(p.created_at) {
        lines.push(format!("Updated:     {}", at.format("%Y-%m-%d %H:%M UTC")));
    }
    if !p.description.is_empty() {
        lines.push(String::new());
        lines.push(p.description.clone());
    }
    lines.join("\n")
}

fn validation(field: &str, err: stockroom_core::CoreError) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: err.to_string(),
    }
}

fn read_images(paths: &[PathBuf]) -> Result<Vec<ImageAttachment>, CliError> {
    paths
        .iter()
        .map(|p| ImageAttachment::from_path(p).map_err(|e| validation("image", e)))
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    catalog: &Catalog,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProductsCommand::List { favorites } => {
            util::load_products(catalog, global).await?;
            let favs = catalog.load_cached_favorites();
            let products = catalog.visible_products(favorites);
            let out = output::render_list(
                &global.output,
                &products,
                |p| ProductRow::new(p, &favs),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::Get { id } => {
            let product =
                util::with_spinner("Fetching product", global, util::resolve_product(catalog, &id))
                    .await?;
            let favs = catalog.load_cached_favorites();
            let out = output::render_single(
                &global.output,
                &product,
                |p| detail(p, &favs),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::Create(args) => create(catalog, args, global).await,

        ProductsCommand::Update(args) => update(catalog, args, global).await,

        ProductsCommand::Delete { id } => {
            let product = util::resolve_product(catalog, &id).await?;
            let prompt = format!("Delete product '{}' ({})?", product.name, product.sku);
            if !util::confirm(&prompt, "products delete", global)? {
                return Ok(());
            }
            util::with_spinner("Deleting", global, catalog.delete_product(&product.id)).await?;
            output::success(
                &format!("Deleted product {}", product.id),
                &global.color,
                global.quiet,
            );
            Ok(())
        }
    }
}

async fn create(catalog: &Catalog, args: CreateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let req = CreateProductRequest {
        sku: args.sku,
        name: args.name,
        description: args.description,
        price: parse_price(&args.price).map_err(|e| validation("price", e))?,
        quantity: parse_quantity(&args.quantity).map_err(|e| validation("quantity", e))?,
        images: read_images(&args.images)?,
    };
    let created = util::with_spinner("Creating product", global, catalog.create_product(&req)).await?;

    let favs = catalog.load_cached_favorites();
    let out = output::render_single(
        &global.output,
        &created,
        |p| detail(p, &favs),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

async fn update(catalog: &Catalog, args: UpdateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let current = util::resolve_product(catalog, &args.id).await?;

    let mut req = UpdateProductRequest::from_product(&current);
    if let Some(sku) = args.sku {
        req.sku = sku;
    }
    if let Some(name) = args.name {
        req.name = name;
    }
    if let Some(description) = args.description {
        req.description = description;
    }
    if let Some(price) = args.price {
        req.price = parse_price(&price).map_err(|e| validation("price", e))?;
    }
    if let Some(quantity) = args.quantity {
        req.quantity = parse_quantity(&quantity).map_err(|e| validation("quantity", e))?;
    }
    req.images = read_images(&args.images)?;
    req.thumbnail = args.thumbnail;

    let updated =
        util::with_spinner("Updating product", global, catalog.update_product(&current.id, &req))
            .await?;

    let favs = catalog.load_cached_favorites();
    let out = output::render_single(
        &global.output,
        &updated,
        |p| detail(p, &favs),
        |p| p.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
