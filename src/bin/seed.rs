use basket_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Users,
        baskets::ActiveModel as BasketActive,
        products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

const USER_COUNT: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm, &config.migrations_dir).await?;

    if Users::find().count(&orm).await? > 0 {
        println!("Database already seeded, nothing to do");
        return Ok(());
    }

    seed_users_with_baskets(&orm).await?;
    seed_products(&orm).await?;

    println!("Seed completed");
    Ok(())
}

async fn seed_users_with_baskets(orm: &DatabaseConnection) -> anyhow::Result<()> {
    for n in 1..=USER_COUNT {
        let user = UserActive {
            id: Set(Uuid::new_v4()),
            name: Set(format!("User {n}")),
            email: Set(format!("user{n}@example.com")),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;

        let basket = BasketActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;

        println!("Seeded {} with basket {}", user.email, basket.id);
    }
    Ok(())
}

async fn seed_products(orm: &DatabaseConnection) -> anyhow::Result<()> {
    let products = vec![
        ("Canvas Tote", "Sturdy everyday bag", 1999),
        ("Ceramic Mug", "Holds 350 ml", 1250),
        ("Sticker Pack", "Ten assorted stickers", 250),
        ("Notebook", "A5, dotted pages", 899),
    ];

    for (name, desc, price) in products {
        ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(Some(desc.to_string())),
            price: Set(price),
            created_at: NotSet,
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
