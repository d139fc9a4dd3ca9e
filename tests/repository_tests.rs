//! Repository behaviour against a migrated in-memory SQLite database.

use anyhow::Result;
use brand_directory::activity;
use brand_directory::models::{Image, Offer};
use brand_directory::repositories::brand::PublicBrandRow;
use brand_directory::repositories::{BrandRepository, OfferRepository, Page, PageRequest};
use chrono::Utc;
use sea_orm::{EntityTrait, PaginatorTrait};

mod test_utils;
use test_utils::{insert_brand, insert_image, insert_offer_mix, setup_test_db};

#[tokio::test]
async fn delete_removes_brand_offers_and_images_only_for_that_brand() -> Result<()> {
    let db = setup_test_db().await?;
    let doomed = insert_brand(&db, "Doomed").await?;
    let kept = insert_brand(&db, "Kept").await?;
    insert_offer_mix(&db, doomed.id).await?;
    insert_offer_mix(&db, kept.id).await?;
    insert_image(&db, doomed.id, "https://cdn.example.com/d.png").await?;
    insert_image(&db, kept.id, "https://cdn.example.com/k.png").await?;

    let repo = BrandRepository::new(&db);
    repo.delete(doomed.id).await?;

    assert!(repo.find(doomed.id).await?.is_none());
    assert_eq!(Offer::find().count(&db).await?, 4);
    assert_eq!(Image::find().count(&db).await?, 1);

    let err = repo.delete(doomed.id).await.unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}

#[tokio::test]
async fn effective_query_agrees_with_predicate() -> Result<()> {
    let db = setup_test_db().await?;
    let brand = insert_brand(&db, "Acme").await?;
    let offers = insert_offer_mix(&db, brand.id).await?;
    let now = Utc::now();

    let expected: Vec<_> = offers
        .iter()
        .filter(|offer| {
            activity::is_effective(
                offer.active,
                offer.start_date.to_utc(),
                offer.end_date.map(|end| end.to_utc()),
                now,
            )
        })
        .map(|offer| offer.id)
        .collect();

    let page = OfferRepository::new(&db)
        .list_effective(PageRequest::default(), None, now)
        .await?;
    let listed: Vec<_> = page.items.iter().map(|(offer, _)| offer.id).collect();
    assert_eq!(listed, expected);

    let detail = BrandRepository::new(&db).public_detail(brand.id, now).await?;
    let detail_ids: Vec<_> = detail.offers.iter().map(|offer| offer.id).collect();
    assert_eq!(detail_ids, expected);

    let admin = BrandRepository::new(&db).admin_detail(brand.id).await?;
    assert_eq!(admin.offers.len(), 4);
    Ok(())
}

fn names(page: Page<PublicBrandRow>) -> Vec<String> {
    page.items.into_iter().map(|row| row.brand.name).collect()
}

#[tokio::test]
async fn search_treats_wildcards_literally() -> Result<()> {
    let db = setup_test_db().await?;
    for name in ["100% Cotton", "Cotton Club", "Under_Score", "UnderXScore"] {
        insert_brand(&db, name).await?;
    }
    let repo = BrandRepository::new(&db);
    let now = Utc::now();

    let page = repo
        .list_public(PageRequest::default(), Some("0%"), now)
        .await?;
    assert_eq!(names(page), ["100% Cotton"]);

    let page = repo
        .list_public(PageRequest::default(), Some("under_"), now)
        .await?;
    assert_eq!(names(page), ["Under_Score"]);

    let page = repo
        .list_public(PageRequest::default(), Some("   "), now)
        .await?;
    assert_eq!(page.total, 4);
    Ok(())
}

#[tokio::test]
async fn pages_past_the_end_are_empty_but_counted() -> Result<()> {
    let db = setup_test_db().await?;
    for name in ["A", "B", "C"] {
        insert_brand(&db, name).await?;
    }

    let page = BrandRepository::new(&db)
        .list_admin(PageRequest { page: 5, limit: 2 }, None, Utc::now())
        .await?;

    assert!(page.items.is_empty());
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages(), 2);
    Ok(())
}
