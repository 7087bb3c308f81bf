//! Repairing corrupted stores

use pagetree_cms::prelude::*;
use pagetree_conf::CmsSettings;
use pagetree_tree::TreeProblem;
use rstest::{fixture, rstest};

#[fixture]
fn cms() -> Cms {
	Cms::new(CmsSettings::default()).unwrap()
}

async fn chain(cms: &Cms) -> (Page, Page, Page) {
	let pages = cms.pages();
	let root = pages.create_page(CreatePage::new("root", "en")).await.unwrap();
	let about = pages
		.create_page(CreatePage::new("about", "en").under(root.id))
		.await
		.unwrap();
	let team = pages
		.create_page(CreatePage::new("team", "en").under(about.id))
		.await
		.unwrap();
	(root, about, team)
}

#[rstest]
#[tokio::test]
async fn test_clean_store_reports_nothing(cms: Cms) {
	// Arrange
	chain(&cms).await;

	// Act
	let report = cms.fix_tree().await.unwrap();

	// Assert
	assert!(report.is_clean(), "{report:?}");
}

#[rstest]
#[tokio::test]
async fn test_repairs_counters_urls_and_languages(cms: Cms) {
	// Arrange
	let (root, about, team) = chain(&cms).await;
	cms.store()
		.atomic(|tx| {
			let mut node = tx.nodes.get(about.node)?.clone();
			node.depth = 5;
			node.numchild = 0;
			tx.nodes.insert_raw(node);
			for url in tx.urls.values_mut().filter(|url| url.page == team.id) {
				url.path = Some("somewhere/else".to_string());
			}
			tx.page_mut(about.id)?.update_languages(&["en", "fr"]);
			Ok(())
		})
		.await
		.unwrap();

	// Act
	let report = cms.fix_tree().await.unwrap();

	// Assert
	assert!(report.tree.problems.contains(&TreeProblem::DepthMismatch {
		node: about.node,
		stored: 5,
		expected: 2,
	}));
	assert!(report.tree.problems.contains(&TreeProblem::NumchildMismatch {
		node: about.node,
		stored: 0,
		expected: 1,
	}));
	assert_eq!(report.urls_rewritten, 1);
	assert_eq!(report.languages_fixed, vec![about.id]);
	assert!(report.demoted_homes.is_empty());

	let tx = cms.store().read().await;
	assert!(tx.nodes.check_integrity().is_empty());
	assert_eq!(tx.nodes.get(about.node).unwrap().depth, 2);
	assert_eq!(tx.page(about.id).unwrap().get_languages(), vec!["en".to_string()]);
	assert_eq!(
		tx.url_for(team.id, "en").and_then(|url| url.path.as_deref()),
		Some("root/about/team")
	);
	drop(tx);
	assert_eq!(
		cms.pages().get_absolute_url(&root, "en").await.unwrap().as_deref(),
		Some("/en/root/")
	);
}

#[rstest]
#[tokio::test]
async fn test_repair_invalidates_every_cache(cms: Cms) {
	// Arrange
	chain(&cms).await;
	let before = cms.invalidator().history().len();

	// Act
	cms.fix_tree().await.unwrap();

	// Assert
	let applied = &cms.invalidator().history()[before..];
	assert_eq!(
		applied,
		&[
			InvalidationTarget::PageCache(1),
			InvalidationTarget::MenuCache(1),
			InvalidationTarget::AllPermissions,
		]
	);
}

#[rstest]
#[tokio::test]
async fn test_second_repair_is_clean(cms: Cms) {
	// Arrange
	let (_, about, _) = chain(&cms).await;
	cms.store()
		.atomic(|tx| {
			let mut node = tx.nodes.get(about.node)?.clone();
			node.numchild = 7;
			tx.nodes.insert_raw(node);
			Ok(())
		})
		.await
		.unwrap();

	// Act
	let first = cms.fix_tree().await.unwrap();
	let second = cms.fix_tree().await.unwrap();

	// Assert
	assert!(!first.is_clean());
	assert!(second.is_clean(), "{second:?}");
}
