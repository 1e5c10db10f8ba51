use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use pet_lookup::router::Router;
use pet_lookup::routes::api_routes;
use pet_lookup::store::{PetRepository, SqlitePetStore};
use rusqlite::Connection;
use std::hint::black_box;

fn bench_route_match(c: &mut Criterion) {
    let router = Router::new(api_routes()).unwrap();
    c.bench_function("route_match", |b| {
        let test_paths = [
            (Method::GET, "/api/pets/1"),
            (Method::GET, "/api/pets/9223372036854775807"),
            (Method::GET, "/api/pets/abc"),
            (Method::GET, "/api/owners/1"),
            (Method::POST, "/api/pets/1"),
        ];
        b.iter(|| {
            for (method, path) in &test_paths {
                let res = router.route(method.clone(), path);
                black_box(&res);
            }
        })
    });
}

fn bench_store_lookup(c: &mut Criterion) {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE Owner (id INTEGER PRIMARY KEY, name TEXT NOT NULL, email TEXT);
         CREATE TABLE Pet (id INTEGER PRIMARY KEY, name TEXT NOT NULL, species TEXT,
                           ownerId INTEGER REFERENCES Owner(id));
         INSERT INTO Owner (id, name, email) VALUES (7, 'Alice', 'alice@example.com');
         INSERT INTO Pet (id, name, species, ownerId) VALUES (1, 'Rex', 'dog', 7);",
    )
    .unwrap();
    let store = SqlitePetStore::from_connection(conn).unwrap();

    let mut group = c.benchmark_group("store_lookup");
    group.bench_function("hit", |b| {
        b.iter(|| black_box(store.find_pet_with_owner(black_box(1)).unwrap()))
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(store.find_pet_with_owner(black_box(404)).unwrap()))
    });
    group.finish();
}

criterion_group!(benches, bench_route_match, bench_store_lookup);
criterion_main!(benches);
