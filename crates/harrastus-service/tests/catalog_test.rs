//! Catalog write paths: validation, geocoding, taxonomies and benefits.

mod common;

use common::{Harness, StubGeocoder, date, time};
use harrastus_core::error::HarrastusError;
use harrastus_core::models::category::{CreateCategory, TaxonomyKind};
use harrastus_core::models::coordinate::Coordinate;
use harrastus_core::models::hobby::{CreateHobby, PriceType, UpdateHobby};
use harrastus_core::models::localized::LocalizedText;
use harrastus_core::models::location::CreateLocation;
use harrastus_core::models::promotion::CreatePromotion;
use harrastus_core::repository::{CatalogRepositories, HobbyRepository, LocationRepository};
use uuid::Uuid;

fn priced(name: &str, price_type: PriceType, price_amount: i64) -> CreateHobby {
    let mut input = CreateHobby::new(name);
    input.price_type = price_type;
    input.price_amount = price_amount;
    input
}

// -----------------------------------------------------------------------
// Hobbies
// -----------------------------------------------------------------------

#[tokio::test]
async fn free_hobby_with_amount_is_rejected() {
    let h = Harness::new().await;
    let err = h
        .writer()
        .create_hobby(None, priced("Chess", PriceType::Free, 5))
        .await
        .unwrap_err();
    assert!(err.field_errors().is_some());
    assert!(h.catalog.hobbies().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn annual_hobby_needs_an_amount() {
    let h = Harness::new().await;
    let writer = h.writer();
    assert!(
        writer
            .create_hobby(None, priced("Chess", PriceType::Annual, 0))
            .await
            .is_err()
    );
    let hobby = writer
        .create_hobby(None, priced("Chess", PriceType::Free, 0))
        .await
        .unwrap();
    assert_eq!(hobby.price_type, PriceType::Free);
}

#[tokio::test]
async fn price_update_is_checked_against_stored_values() {
    let h = Harness::new().await;
    let writer = h.writer();
    let owner = Uuid::new_v4();
    let hobby = writer
        .create_hobby(Some(owner), priced("Chess", PriceType::Annual, 9000))
        .await
        .unwrap();

    let err = writer
        .update_hobby(
            owner,
            hobby.id,
            UpdateHobby {
                price_type: Some(PriceType::Free),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, HarrastusError::Validation(_)));

    let updated = writer
        .update_hobby(
            owner,
            hobby.id,
            UpdateHobby {
                price_type: Some(PriceType::Free),
                price_amount: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price_amount, 0);
}

#[tokio::test]
async fn only_editors_may_delete_hobbies() {
    let h = Harness::new().await;
    let writer = h.writer();
    let owner = Uuid::new_v4();
    let hobby = writer
        .create_hobby(Some(owner), CreateHobby::new("Chess"))
        .await
        .unwrap();

    let err = writer.delete_hobby(Uuid::new_v4(), hobby.id).await.unwrap_err();
    assert!(matches!(err, HarrastusError::AuthorizationDenied { .. }));

    writer.delete_hobby(owner, hobby.id).await.unwrap();
    assert!(h.catalog.hobbies().list().await.unwrap().is_empty());
}

// -----------------------------------------------------------------------
// Locations & geocoding
// -----------------------------------------------------------------------

#[tokio::test]
async fn location_without_coordinates_is_geocoded_on_create() {
    let h = Harness::new().await;
    let geocoder = StubGeocoder::new(60.2, 24.9);
    let writer = h.writer_with_geocoder(geocoder.clone());

    let mut input = CreateLocation::new("Library");
    input.address = "Main street 1".into();
    input.city = "Espoo".into();
    let location = writer.create_location(None, input).await.unwrap();
    assert_eq!(location.coordinates, Some(Coordinate::new(60.2, 24.9)));
    assert_eq!(geocoder.calls(), 1);

    let mut input = CreateLocation::new("Pool");
    input.coordinates = Some(Coordinate::new(60.1, 24.8));
    writer.create_location(None, input).await.unwrap();
    assert_eq!(geocoder.calls(), 1);
}

#[tokio::test]
async fn failed_geocoding_rejects_the_location() {
    let h = Harness::new().await;
    let writer = h.writer_with_geocoder(StubGeocoder::new(60.2, 24.9));

    let mut input = CreateLocation::new("Shed");
    input.address = "nowhere".into();
    let err = writer.create_location(None, input).await.unwrap_err();
    assert!(matches!(err, HarrastusError::Geocoding { .. }));
    assert!(h.catalog.locations().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let h = Harness::new().await;
    let mut input = CreateLocation::new("Pole");
    input.coordinates = Some(Coordinate::new(95.0, 0.0));
    let err = h.writer().create_location(None, input).await.unwrap_err();
    let errors = err.field_errors().unwrap();
    assert!(errors.contains("latitude"));
}

#[tokio::test]
async fn batch_geocoding_fixes_hand_entered_locations_only() {
    let h = Harness::new().await;
    let geocoder = StubGeocoder::new(61.5, 23.8);

    let mut placeholder = CreateLocation::new("Placeholder");
    placeholder.coordinates = Some(Coordinate::new(0.0, 0.0));
    let placeholder = h.catalog.locations().create(placeholder).await.unwrap();

    let mut missing = CreateLocation::new("Missing");
    missing.address = "nowhere".into();
    let missing = h.catalog.locations().create(missing).await.unwrap();

    let mut imported = CreateLocation::new("Imported");
    imported.data_source = "lipas".into();
    h.catalog.locations().create(imported).await.unwrap();

    let mut fine = CreateLocation::new("Fine");
    fine.coordinates = Some(Coordinate::new(60.0, 25.0));
    h.catalog.locations().create(fine).await.unwrap();

    let report = h
        .writer_with_geocoder(geocoder.clone())
        .geocode_locations()
        .await
        .unwrap();
    assert_eq!(report.geocoded, [placeholder.id]);
    assert_eq!(report.failed, [missing.id]);
    assert_eq!(geocoder.calls(), 2);

    let fixed = h.catalog.locations().get_by_id(placeholder.id).await.unwrap();
    assert_eq!(fixed.coordinates, Some(Coordinate::new(61.5, 23.8)));
}

#[tokio::test]
async fn batch_geocoding_requires_a_geocoder() {
    let h = Harness::new().await;
    let err = h.writer().geocode_locations().await.unwrap_err();
    assert!(matches!(err, HarrastusError::Internal(_)));
}

// -----------------------------------------------------------------------
// Taxonomies
// -----------------------------------------------------------------------

#[tokio::test]
async fn category_parent_must_share_the_taxonomy() {
    let h = Harness::new().await;
    let writer = h.writer();
    let adults = writer
        .create_category(CreateCategory::new(
            TaxonomyKind::Audience,
            LocalizedText::new("Adults"),
            None,
        ))
        .await
        .unwrap();

    let err = writer
        .create_category(CreateCategory::new(
            TaxonomyKind::Category,
            LocalizedText::new("Sports"),
            Some(adults.id),
        ))
        .await
        .unwrap_err();
    assert!(err.field_errors().unwrap().contains("parent"));
}

#[tokio::test]
async fn deleting_category_strips_it_from_hobbies() {
    let h = Harness::new().await;
    let writer = h.writer();
    let sports = writer
        .create_category(CreateCategory::new(
            TaxonomyKind::Category,
            LocalizedText::new("Sports"),
            None,
        ))
        .await
        .unwrap();
    let mut input = CreateHobby::new("Football");
    input.categories = vec![sports.id];
    let hobby = writer.create_hobby(None, input).await.unwrap();

    let removed = writer.delete_category(sports.id).await.unwrap();
    assert_eq!(removed, [sports.id]);
    let hobby = h.catalog.hobbies().get_by_id(hobby.id).await.unwrap();
    assert!(hobby.categories.is_empty());
}

// -----------------------------------------------------------------------
// Promotions
// -----------------------------------------------------------------------

#[tokio::test]
async fn promotion_records_creator_and_runs_out() {
    let h = Harness::new().await;
    let writer = h.writer();
    let author = Uuid::new_v4();
    let municipality = h.municipality(&writer, "Espoo", &[author]).await;

    let promotion = writer
        .create_promotion(
            Some(author),
            CreatePromotion {
                name: "Trial week".into(),
                description: String::new(),
                start_date: date(2026, 1, 1),
                start_time: time(0, 0),
                end_date: date(2026, 6, 30),
                end_time: time(23, 59),
                cover_image: None,
                location_id: None,
                organizer_id: None,
                municipality_id: None,
                created_by: None,
                available_count: 1,
            },
        )
        .await
        .unwrap();
    assert_eq!(promotion.created_by, Some(author));
    assert_eq!(promotion.municipality_id, Some(municipality));

    writer.claim_benefit(promotion.id, None).await.unwrap();
    let err = writer.claim_benefit(promotion.id, None).await.unwrap_err();
    assert!(matches!(err, HarrastusError::Validation(_)));
}
