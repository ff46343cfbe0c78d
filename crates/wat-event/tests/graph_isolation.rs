//! End-to-end ownership scenarios across the whole record graph.

use wat_entity::{SignChangeEvent, World};
use wat_event::{fire_sign_change, Registry};
use wat_heap::{lifecycle, AppendMode, DeepCopy, Shared};
use wat_test_utils::{leak_check, player, strings, TestWorldBuilder};

fn first_chunk_entity(world: &World) -> &Shared<wat_entity::Entity> {
    let chunks = world.loaded_chunks.as_ref().unwrap();
    let chunk = &chunks.as_slice()[0];
    &chunk.entities.as_ref().unwrap().as_slice()[0]
}

#[test]
fn deep_copied_world_isolates_fire_ticks() {
    leak_check(|| {
        let world = TestWorldBuilder::new().chunks(2).entities_per_chunk(3).build();
        let mut copy = lifecycle::deep_copy(Some(&world)).unwrap().unwrap();
        assert_eq!(copy.ref_count(), 1);
        assert!(!Shared::ptr_eq(&copy, &world));

        {
            let copy = copy.get_mut().unwrap();
            let chunks = copy.loaded_chunks.as_mut().and_then(Shared::get_mut).unwrap();
            let chunk = chunks.as_mut_slice()[0].get_mut().unwrap();
            let entities = chunk.entities.as_mut().and_then(Shared::get_mut).unwrap();
            entities.as_mut_slice()[0].get_mut().unwrap().fire_ticks = 100;
        }

        assert_eq!(first_chunk_entity(&copy).fire_ticks, 100);
        assert_eq!(first_chunk_entity(&world).fire_ticks, 0);
    });
}

#[test]
fn shared_entity_mutation_is_seen_through_every_array() {
    leak_check(|| {
        let mut world = TestWorldBuilder::new().entities_per_chunk(1).build();
        let via_world_list = world.entities.as_ref().unwrap().as_slice()[0].clone();
        assert!(Shared::ptr_eq(first_chunk_entity(&world), &via_world_list));

        // Two arrays plus the local handle hold the entity.
        assert_eq!(via_world_list.ref_count(), 3);
        let mut handle = via_world_list;
        // SAFETY: no other borrow into the entity is live on this thread.
        unsafe { handle.get_mut_unchecked().fire_ticks = 7 };
        assert_eq!(first_chunk_entity(&world).fire_ticks, 7);

        drop(handle);
        lifecycle::delete(&mut Some(world.clone()));
        assert_eq!(world.ref_count(), 1);
        world.get_mut().unwrap().name = None;
    });
}

#[test]
fn sign_change_callback_sees_fresh_event() {
    leak_check(|| {
        let registry = Registry::new();
        registry.register::<SignChangeEvent, _>(|event| {
            assert!(!event.cancel);
            assert_eq!(event.ref_count(), 1);
            let lines = event.lines.as_ref().unwrap();
            assert_eq!(lines.len(), 4);
        });
        let steve = player("Steve", 9);
        let lines = strings(&["&aHello", "", "line 3", "4"]);
        let outcome = fire_sign_change(&registry, Some(&steve), Some(&lines))
            .unwrap()
            .unwrap();
        assert!(!outcome.cancelled);
        drop(outcome);
        assert_eq!(steve.ref_count(), 1);
        assert_eq!(lines.ref_count(), 1);
        registry.clear();
    });
}

#[test]
fn isolate_append_of_world_players() {
    leak_check(|| {
        let world = TestWorldBuilder::new().player("Alex").build();
        let players = world.players.as_ref().unwrap();
        let alex = &players.as_slice()[0];
        let mut roster = wat_heap::Array::new();
        lifecycle::append(Some(&mut roster), Some(alex), AppendMode::Isolate).unwrap();
        lifecycle::append(Some(&mut roster), Some(alex), AppendMode::Share).unwrap();
        assert_eq!(alex.ref_count(), 2);
        assert_eq!(*roster.as_slice()[0], **alex);
        assert!(!Shared::ptr_eq(&roster.as_slice()[0], alex));
        let copy = roster.deep_copy().unwrap();
        assert_eq!(copy.len(), 2);
    });
}
