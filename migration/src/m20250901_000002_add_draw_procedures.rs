use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Installs the two atomic draw procedures.
///
/// `draw_pick_winner` is the single mutation point for recording a winner: it
/// locks the item row, re-validates quota and duplicate rules, inserts the
/// winner, bumps the quota counter and appends the live event in one
/// transaction, so concurrent picks against the same item cannot both get past
/// the quota and the same student cannot be recorded twice.
///
/// Both procedures return a jsonb object
/// `{ ok, message, winner_student_id, remaining_after, forced }` which the
/// service layer normalizes into `PickResult`.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();

        let pick_fn = r#"
CREATE OR REPLACE FUNCTION draw_pick_winner(
    p_item_id bigint,
    p_mode text,
    p_student_id text,
    p_force boolean
) RETURNS jsonb
LANGUAGE plpgsql AS $$
DECLARE
    v_item draw_items%ROWTYPE;
    v_student students%ROWTYPE;
    v_forced boolean := (p_mode = 'forced');
BEGIN
    SELECT * INTO v_item FROM draw_items WHERE id = p_item_id FOR UPDATE;
    IF NOT FOUND THEN
        RETURN jsonb_build_object('ok', false, 'message', 'draw item not found',
            'winner_student_id', NULL, 'remaining_after', NULL, 'forced', false);
    END IF;

    IF v_item.winner_count >= v_item.winner_quota THEN
        RETURN jsonb_build_object('ok', false, 'message', 'winner quota exhausted',
            'winner_student_id', NULL, 'remaining_after', 0, 'forced', false);
    END IF;

    IF p_student_id IS NULL THEN
        RETURN jsonb_build_object('ok', false, 'message', 'no candidate supplied',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    SELECT * INTO v_student FROM students WHERE student_id = p_student_id;
    IF NOT FOUND THEN
        RETURN jsonb_build_object('ok', false, 'message', 'unknown student',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    -- Same-item duplicate is a hard invariant; no override exists for it.
    IF EXISTS (SELECT 1 FROM draw_winners
               WHERE draw_item_id = p_item_id AND student_id = p_student_id) THEN
        RETURN jsonb_build_object('ok', false, 'message', 'student already won this item',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    IF NOT v_item.allow_duplicate_winners AND EXISTS (
        SELECT 1 FROM draw_winners
        WHERE student_id = p_student_id AND draw_item_id <> p_item_id) THEN
        IF NOT p_force THEN
            RETURN jsonb_build_object('ok', false, 'message', 'student already won a different item',
                'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
        END IF;
        v_forced := true;
    END IF;

    IF v_student.is_suspended OR v_student.draw_number IS NULL OR v_student.draw_number = '' THEN
        IF p_mode = 'forced' AND p_force THEN
            v_forced := true;
        ELSE
            RETURN jsonb_build_object('ok', false, 'message', 'student not in active pool',
                'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
        END IF;
    END IF;

    UPDATE draw_items SET winner_count = winner_count + 1, updated_at = NOW()
    WHERE id = p_item_id;

    INSERT INTO draw_winners (draw_item_id, student_id, selected_mode, is_forced, is_public)
    VALUES (p_item_id, p_student_id, p_mode, v_forced, TRUE);

    INSERT INTO draw_live_events (id, draw_item_id, draw_item_name, winner_student_id, draw_mode, is_forced, is_public)
    VALUES (gen_random_uuid(), p_item_id, v_item.name, p_student_id, p_mode, v_forced, v_item.is_public);

    RETURN jsonb_build_object('ok', true, 'message', 'winner recorded',
        'winner_student_id', p_student_id,
        'remaining_after', v_item.winner_quota - v_item.winner_count - 1,
        'forced', v_forced);
END;
$$;
"#;

        let update_fn = r#"
CREATE OR REPLACE FUNCTION draw_update_winner(
    p_winner_id bigint,
    p_student_id text,
    p_force boolean
) RETURNS jsonb
LANGUAGE plpgsql AS $$
DECLARE
    v_winner draw_winners%ROWTYPE;
    v_item draw_items%ROWTYPE;
    v_student students%ROWTYPE;
    v_forced boolean := false;
BEGIN
    SELECT * INTO v_winner FROM draw_winners WHERE id = p_winner_id FOR UPDATE;
    IF NOT FOUND THEN
        RETURN jsonb_build_object('ok', false, 'message', 'winner record not found',
            'winner_student_id', NULL, 'remaining_after', NULL, 'forced', false);
    END IF;

    -- The winner stays attached to its item; only the student assignment moves.
    SELECT * INTO v_item FROM draw_items WHERE id = v_winner.draw_item_id FOR UPDATE;

    IF p_student_id IS NULL THEN
        RETURN jsonb_build_object('ok', false, 'message', 'no candidate supplied',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    SELECT * INTO v_student FROM students WHERE student_id = p_student_id;
    IF NOT FOUND THEN
        RETURN jsonb_build_object('ok', false, 'message', 'unknown student',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    IF EXISTS (SELECT 1 FROM draw_winners
               WHERE draw_item_id = v_winner.draw_item_id
                 AND student_id = p_student_id
                 AND id <> p_winner_id) THEN
        RETURN jsonb_build_object('ok', false, 'message', 'student already won this item',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    IF NOT v_item.allow_duplicate_winners AND EXISTS (
        SELECT 1 FROM draw_winners
        WHERE student_id = p_student_id AND draw_item_id <> v_winner.draw_item_id) THEN
        IF NOT p_force THEN
            RETURN jsonb_build_object('ok', false, 'message', 'student already won a different item',
                'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
        END IF;
        v_forced := true;
    END IF;

    IF v_student.is_suspended OR v_student.draw_number IS NULL OR v_student.draw_number = '' THEN
        RETURN jsonb_build_object('ok', false, 'message', 'student not in active pool',
            'winner_student_id', NULL, 'remaining_after', v_item.winner_quota - v_item.winner_count, 'forced', false);
    END IF;

    UPDATE draw_winners
    SET student_id = p_student_id,
        is_forced = (is_forced OR v_forced),
        updated_at = NOW()
    WHERE id = p_winner_id;

    RETURN jsonb_build_object('ok', true, 'message', 'winner updated',
        'winner_student_id', p_student_id,
        'remaining_after', v_item.winner_quota - v_item.winner_count,
        'forced', v_forced);
END;
$$;
"#;

        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            pick_fn.to_string(),
        ))
        .await?;

        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            update_fn.to_string(),
        ))
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DROP FUNCTION IF EXISTS draw_pick_winner(bigint, text, text, boolean);".to_string(),
        ))
        .await?;
        conn.execute(Statement::from_string(
            manager.get_database_backend(),
            "DROP FUNCTION IF EXISTS draw_update_winner(bigint, text, boolean);".to_string(),
        ))
        .await?;
        Ok(())
    }
}
