//! Property-based tests for managed URL paths

use pagetree_cms::prelude::*;
use pagetree_cms::store::Tables;
use pagetree_conf::CmsSettings;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
	Create { parent: Option<Index> },
	Move { page: Index, target: Index },
	Homepage { root: Index },
}

fn op() -> impl Strategy<Value = Op> {
	prop_oneof![
		3 => proptest::option::of(any::<Index>()).prop_map(|parent| Op::Create { parent }),
		2 => (any::<Index>(), any::<Index>()).prop_map(|(page, target)| Op::Move { page, target }),
		1 => any::<Index>().prop_map(|root| Op::Homepage { root }),
	]
}

fn expected_path(tx: &Tables, page: &Page) -> Option<String> {
	if page.is_home {
		return Some(String::new());
	}
	let slug = tx.url_for(page.id, "en")?.slug.clone();
	match tx.parent_page(page.id).ok()? {
		None => Some(slug),
		Some(parent) => {
			let parent_path = tx.url_for(parent.id, "en")?.path.clone()?;
			if parent_path.is_empty() {
				Some(slug)
			} else {
				Some(format!("{parent_path}/{slug}"))
			}
		}
	}
}

async fn apply(cms: &Cms, ops: &[Op]) -> Result<(), TestCaseError> {
	let pages = cms.pages();
	let mut created: Vec<Page> = Vec::new();
	for (n, op) in ops.iter().enumerate() {
		let title = format!("page {n}");
		match op {
			Op::Create { parent } => {
				let input = match parent.as_ref().filter(|_| !created.is_empty()) {
					Some(pick) => CreatePage::new(title, "en").under(pick.get(&created).id),
					None => CreatePage::new(title, "en"),
				};
				created.push(pages.create_page(input).await.expect("unique slugs never collide"));
			}
			Op::Move { page, target } if created.len() > 1 => {
				let page = page.get(&created).id;
				let target = pages.get_page(target.get(&created).id).await.expect("page exists");
				match pages.move_page(page, target.node, Position::LastChild, "admin").await {
					Ok(_) | Err(CmsError::InvalidMove(_)) => {}
					Err(other) => prop_assert!(false, "unexpected move error: {other}"),
				}
			}
			Op::Homepage { root } if !created.is_empty() => {
				let page = root.get(&created).id;
				if pages.get_parent_page(page).await.expect("page exists").is_none() {
					pages.set_as_homepage(page, "admin").await.expect("roots can become home");
				}
			}
			_ => {}
		}
	}
	Ok(())
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn managed_paths_follow_parents(ops in prop::collection::vec(op(), 1..24)) {
		tokio_test::block_on(async {
			let cms = Cms::new(CmsSettings::default()).expect("default settings are valid");
			apply(&cms, &ops).await?;

			let tx = cms.store().read().await;
			let mut seen = HashSet::new();
			for page in tx.pages() {
				let url = tx.url_for(page.id, "en").expect("every page has an en url");
				prop_assert!(url.managed);
				prop_assert_eq!(url.path.clone(), expected_path(&tx, page));
				prop_assert!(seen.insert(url.path.clone()), "duplicate path {:?}", url.path);
			}
			prop_assert!(tx.nodes.check_integrity().is_empty());
			prop_assert!(tx.pages().filter(|page| page.is_home).count() <= 1);
			let ids: Vec<PageId> = tx.pages().map(|page| page.id).collect();
			drop(tx);

			// paths are already current, so recomputing changes nothing
			for page in ids {
				prop_assert!(!cms.pages().update_url_path(page, "en").await.expect("page exists"));
				prop_assert_eq!(cms.pages().update_url_path_recursive(page, "en").await.expect("page exists"), 0);
			}
			Ok(())
		})?;
	}
}
